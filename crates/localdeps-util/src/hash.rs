/// Hash the plain concatenation of `parts`, in order, without separators.
///
/// Same digest as hashing the joined bytes, without building the joined buffer.
#[must_use]
pub fn blake3_concat<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    hasher.finalize().to_hex().to_string()
}
