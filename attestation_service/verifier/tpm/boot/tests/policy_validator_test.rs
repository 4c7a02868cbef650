use tpm_boot_verifier::{package_names, policy_is_valid, rewrite_package_name};

const POLICY: &str = "package keylime.mb\n\ndefault allow = false\n\nallow {\n    input.secure_boot\n}\n";

#[test]
fn test_policy_is_valid() {
    assert!(policy_is_valid(Some(POLICY)));
}

#[test]
fn test_policy_is_valid_any_order() {
    assert!(policy_is_valid(Some("allow = true\n# comment\npackage mb")));
    assert!(policy_is_valid(Some("  default allow := false\n\tpackage   mb.v1")));
}

#[test]
fn test_policy_is_valid_rejects_empty() {
    assert!(!policy_is_valid(None));
    assert!(!policy_is_valid(Some("")));
}

#[test]
fn test_policy_is_valid_requires_both_lines() {
    assert!(!policy_is_valid(Some("package mb\n\ndeny = true\n")));
    assert!(!policy_is_valid(Some("default allow = false\nallow { true }\n")));
}

#[test]
fn test_policy_is_valid_rejects_lookalikes() {
    assert!(!policy_is_valid(Some("package\nallow = true")));
    assert!(!policy_is_valid(Some("# package mb\nallow = true")));
    assert!(!policy_is_valid(Some("package mb\n# allow = true")));
}

#[test]
fn test_policy_is_valid_allow_prefix() {
    assert!(policy_is_valid(Some("package mb\nallowed = true")));
    assert!(policy_is_valid(Some("package mb\nallow_boot { true }")));
    assert!(policy_is_valid(Some("package mb\ndefault   allow_boot = false")));
}

#[test]
fn test_rewrite_package_name() {
    let rewrite = rewrite_package_name(POLICY, "policy_agent_1");

    assert!(rewrite.rewritten);
    assert_eq!(package_names(&rewrite.policy), vec!["policy_agent_1".to_string()]);
    let original: Vec<&str> = POLICY.split('\n').skip(1).collect();
    let rewritten: Vec<&str> = rewrite.policy.split('\n').skip(1).collect();
    assert_eq!(original, rewritten);
}

#[test]
fn test_rewrite_keeps_rest_of_package_line() {
    let rewrite = rewrite_package_name("  package keylime.mb # boot policy\nallow = true", "policy_a");
    assert_eq!(rewrite.policy, "package policy_a # boot policy\nallow = true");
}

#[test]
fn test_rewrite_only_first_package_line() {
    let policy = "package first\nallow = true\npackage second";
    let rewrite = rewrite_package_name(policy, "policy_a");
    assert_eq!(package_names(&rewrite.policy), vec!["policy_a".to_string(), "second".to_string()]);
}

#[test]
fn test_rewrite_without_package_line() {
    let policy = "default allow = false\r\nallow { true }";
    let rewrite = rewrite_package_name(policy, "policy_a");
    assert!(!rewrite.rewritten);
    assert_eq!(rewrite.policy, policy);
}

#[test]
fn test_rewrite_keeps_line_endings() {
    let policy = "package mb\r\nallow = true\r\n";
    let rewrite = rewrite_package_name(policy, "policy_a");
    assert_eq!(rewrite.policy, "package policy_a\r\nallow = true\r\n");
}
