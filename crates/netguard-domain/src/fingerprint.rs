use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a rule result.
///
/// Identity fields:
/// - rule_id
/// - node path (ids from the top-level ancestor down to the node)
/// - line of the node
pub fn fingerprint_for_result(rule_id: &str, node_path: &[&str], line: u32) -> String {
    let line = line.to_string();
    let mut parts = vec![rule_id];
    parts.extend_from_slice(node_path);
    parts.push(&line);
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_path_sensitive() {
        let a = fingerprint_for_result("trunk", &["interface Gi0/1", "switchport mode trunk"], 2);
        let b = fingerprint_for_result("trunk", &["interface Gi0/1", "switchport mode trunk"], 2);
        let c = fingerprint_for_result("trunk", &["interface Gi0/2", "switchport mode trunk"], 2);
        let d = fingerprint_for_result("trunk", &["interface Gi0/1", "switchport mode trunk"], 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 64);
    }
}
