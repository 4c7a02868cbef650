/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */


//! Structural checks and rewrites of Rego policy text
//!
//! These helpers work line by line on the policy text and never parse Rego: a policy is
//! considered well formed when it declares a package and an `allow` rule.

use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*package\s+(\S+)").expect("package pattern is a valid regex"));
static ALLOW_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(default\s+)?allow").expect("allow pattern is a valid regex"));

/// Returns true when `policy` has a package line and an `allow` line, in any order
pub fn policy_is_valid(policy: Option<&str>) -> bool {
    let Some(policy) = policy.filter(|text| !text.is_empty()) else {
        return false;
    };

    let mut has_package = false;
    let mut has_allow = false;
    for line in policy.split('\n') {
        has_package = has_package || PACKAGE_LINE.is_match(line);
        has_allow = has_allow || ALLOW_LINE.is_match(line);
        if has_package && has_allow {
            return true;
        }
    }
    false
}

/// Outcome of [`rewrite_package_name`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRewrite {
    pub policy: String,
    /// false when no package line was found and `policy` is the input unchanged
    pub rewritten: bool,
}

/// Renames the package declared on the first package line to `package_name`.
///
/// Only the `package <name>` prefix of that line is replaced; anything following the name
/// and every other line is kept as is.
pub fn rewrite_package_name(policy: &str, package_name: &str) -> PackageRewrite {
    let mut rewritten = false;
    let lines: Vec<String> = policy
        .split('\n')
        .map(|line| {
            if rewritten {
                return line.to_string();
            }
            match PACKAGE_LINE.find(line) {
                Some(matched) => {
                    rewritten = true;
                    format!("package {}{}", package_name, &line[matched.end()..])
                },
                None => line.to_string(),
            }
        })
        .collect();

    PackageRewrite { policy: lines.join("\n"), rewritten }
}

/// Every package name declared in `policy`, in order of appearance
pub fn package_names(policy: &str) -> Vec<String> {
    policy
        .split('\n')
        .filter_map(|line| PACKAGE_LINE.captures(line))
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}
