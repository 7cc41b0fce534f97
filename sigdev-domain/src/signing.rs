//! Construction of the securable payload for chained signing.

/// Separator between the three payload sections.
const SEPARATOR: u8 = b'_';

/// Build the exact byte string that gets signed.
///
/// Layout (wire contract, version 1):
///
/// ```text
/// <counter as ASCII decimal> '_' <data bytes> '_' <last signature bytes>
/// ```
///
/// The counter is the device's counter *before* this signing operation, and
/// the last signature is the previous operation's raw output (or the chain
/// seed). Embedding the previous signature is what chains the sequence:
/// recomputing signature N forces recomputing every later one.
pub fn secured_payload(counter: u64, data: &[u8], last_signature: &[u8]) -> Vec<u8> {
    let counter = counter.to_string();
    let mut payload =
        Vec::with_capacity(counter.len() + data.len() + last_signature.len() + 2);
    payload.extend_from_slice(counter.as_bytes());
    payload.push(SEPARATOR);
    payload.extend_from_slice(data);
    payload.push(SEPARATOR);
    payload.extend_from_slice(last_signature);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_layout() {
        let payload = secured_payload(0, b"hello", b"seed");
        assert_eq!(payload, b"0_hello_seed");
    }

    #[test]
    fn test_counter_is_decimal_text() {
        let payload = secured_payload(1234, b"data", b"prev");
        assert_eq!(payload, b"1234_data_prev");
    }

    #[test]
    fn test_last_signature_bytes_are_embedded_verbatim() {
        let raw_signature = [0u8, 159, 146, 150];
        let payload = secured_payload(7, b"x", &raw_signature);

        assert!(payload.starts_with(b"7_x_"));
        assert!(payload.ends_with(&raw_signature));
    }
}
