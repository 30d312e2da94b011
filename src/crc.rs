/// CRC-16 with polynomial 0x1021, seeded with 0xFFFF and processed MSB first (CCITT-FALSE).
///
/// Appending the result big-endian to the input makes the checksum of the whole sequence zero,
/// which is how log slots are verified.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &byte in data {
        let mut x = (crc >> 8) as u8 ^ byte;
        x ^= x >> 4;
        let x = x as u16;
        crc = (crc << 8) ^ (x << 12) ^ (x << 5) ^ x;
    }

    crc
}
