use md5::{Digest, Md5};

/// Legacy Mixpanel request signature.
///
/// Parameters are sorted by key, concatenated as `key=value` with no separator, the API
/// secret is appended and the result is MD5-hashed. The scheme is weak; it is reproduced
/// because the export API still requires it.
pub fn sign<'a, I>(parameters: I, secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let material = signing_material(parameters, secret);
    encode_hex(Md5::digest(material.as_bytes()).as_slice())
}

fn signing_material<'a, I>(parameters: I, secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted = parameters.into_iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| left.0.cmp(right.0));

    let mut material = String::new();
    for (key, value) in sorted {
        material.push_str(key);
        material.push('=');
        material.push_str(value);
    }
    material.push_str(secret);
    material
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
