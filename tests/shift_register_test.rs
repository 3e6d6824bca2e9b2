use assert_hex::assert_eq_hex;
use invaders_core::device::shift_register::ShiftRegister;
use test_case::test_case;

// ==========================================================================
// Reset state
// ==========================================================================

#[test]
fn test_power_on_reads_zero() {
    let reg = ShiftRegister::new();
    assert_eq_hex!(reg.read(), 0x00);
}

#[test]
fn test_default_matches_new() {
    assert_eq_hex!(ShiftRegister::default().read(), ShiftRegister::new().read());
}

// ==========================================================================
// Window arithmetic
// ==========================================================================
// Two pushes of 0xCD then 0xAB leave the register holding 0xABCD; the
// read window is the top 8 bits after shifting left by the offset.

#[test_case(0 => 0xAB)]
#[test_case(1 => 0x57)]
#[test_case(2 => 0xAF)]
#[test_case(3 => 0x5E)]
#[test_case(4 => 0xBC)]
#[test_case(5 => 0x79)]
#[test_case(6 => 0xF3)]
#[test_case(7 => 0xE6)]
fn test_window_at_offset(amount: u8) -> u8 {
    let mut reg = ShiftRegister::new();
    reg.set_amount(amount);
    reg.push(0xCD);
    reg.push(0xAB);
    reg.read()
}

#[test]
fn test_window_matches_concatenated_word_for_all_amounts() {
    let (b0, b1) = (0x5Au8, 0xC3u8);
    let word = u16::from(b0) | (u16::from(b1) << 8);
    for amount in 0..8u8 {
        let mut reg = ShiftRegister::new();
        reg.set_amount(amount);
        reg.push(b0);
        reg.push(b1);
        let expected = ((word >> (8 - u32::from(amount))) & 0xFF) as u8;
        assert_eq!(reg.read(), expected, "amount {amount}");
    }
}

#[test]
fn test_amount_can_be_changed_between_reads() {
    let mut reg = ShiftRegister::new();
    reg.push(0x80);
    reg.push(0x01);
    // Register holds 0x0180.
    reg.set_amount(7);
    assert_eq_hex!(reg.read(), 0xC0);
    reg.set_amount(0);
    assert_eq_hex!(reg.read(), 0x01);
}

// ==========================================================================
// Input masking and byte ordering
// ==========================================================================

#[test]
fn test_amount_is_masked_to_three_bits() {
    let mut masked = ShiftRegister::new();
    masked.set_amount(0xFA); // low three bits: 2
    let mut plain = ShiftRegister::new();
    plain.set_amount(0x02);

    for reg in [&mut masked, &mut plain] {
        reg.push(0x12);
        reg.push(0x34);
    }
    assert_eq_hex!(masked.read(), plain.read());
}

#[test]
fn test_push_discards_the_oldest_byte() {
    let mut reg = ShiftRegister::new();
    reg.push(0x11);
    reg.push(0x22);
    reg.push(0x33);
    // Offset 0 reads the newest byte, offset 7 reaches back into the
    // byte before it; 0x11 is gone.
    reg.set_amount(0);
    assert_eq_hex!(reg.read(), 0x33);
    reg.set_amount(7);
    // Register holds 0x3322; the window at offset 7 is bits 1-8.
    assert_eq_hex!(reg.read(), 0x91);
}
