//! FDF serialization of rendered field values

use crate::RenderedValues;

const HEADER: &[u8] = b"%FDF-1.2\n%\xe2\xe3\xcf\xd3\r\n1 0 obj\n<</FDF\n<<\n/Fields [\n";
const TRAILER: &[u8] = b"]\n>>\n>>\nendobj\ntrailer\n\n<<\n/Root 1 0 R\n>>\n%%EOF\n";

/// Encode `text` as the body of a PDF literal string: UTF-16BE with BOM,
/// with delimiter bytes escaped
pub fn encode_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&[0xFE, 0xFF]);

    let mut push = |byte: u8| {
        match byte {
            b'\\' | b'(' | b')' => out.extend_from_slice(&[b'\\', byte]),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(byte),
        }
    };

    for unit in text.encode_utf16() {
        let [hi, lo] = unit.to_be_bytes();
        push(hi);
        push(lo);
    }
    out
}

/// Build an FDF document setting each field's value
pub fn forge(values: &RenderedValues) -> Vec<u8> {
    let mut fdf = HEADER.to_vec();

    for (name, value) in values {
        fdf.extend_from_slice(b"<</T(");
        fdf.extend_from_slice(&encode_string(name));
        fdf.extend_from_slice(b")/V(");
        fdf.extend_from_slice(&encode_string(value));
        fdf.extend_from_slice(b")>>\n");
    }

    fdf.extend_from_slice(TRAILER);
    fdf
}
