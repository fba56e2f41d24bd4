use blake3::Hasher;

/// Computes the hex digest stored in the trust store for an API key.
///
/// Credentials are never kept in plain text: the trust store holds only
/// BLAKE3 digests and presented keys are hashed before lookup.
#[inline]
pub fn hash_credential(key: &str) -> String {
    blake3::hash(key.as_bytes()).to_hex().to_string()
}

/// Computes the response-cache key for a scoring request.
///
/// The digest covers the feature vector bytes and the effective `top_k`,
/// separated to avoid ambiguity between the two fields. Scoring is
/// deterministic for a loaded model version, so identical digests map to
/// identical outcomes for the lifetime of the process.
#[inline]
pub fn hash_request(features: &[f32], top_k: usize) -> [u8; 32] {
    let mut hasher = Hasher::new();
    for value in features {
        hasher.update(&value.to_le_bytes());
    }
    hasher.update(b"|");
    hasher.update(&(top_k as u64).to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from
/// 256 bits. Suitable for log correlation ids and map keys, not for
/// anything that must resist collisions.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
