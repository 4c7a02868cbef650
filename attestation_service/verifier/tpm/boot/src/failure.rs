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


//! Accumulable verification failure reports
//!
//! A [`Failure`] starts empty and collects one [`Event`] per problem found by a verification
//! step. An empty report means the step succeeded.

use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Part of the attestation pipeline an event originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    QuoteValidation,
    PcrValidation,
    MeasuredBoot,
    Ima,
    Internal,
    Default,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::QuoteValidation => "quote_validation",
            Component::PcrValidation => "pcr_validation",
            Component::MeasuredBoot => "measured_boot",
            Component::Ima => "ima",
            Component::Internal => "internal",
            Component::Default => "default",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found during verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// `<component>.<code>`
    pub event_id: String,
    pub code: String,
    pub context: Value,
    pub fatal: bool,
}

impl Event {
    pub fn new(component: Component, code: &str, context: Value, fatal: bool) -> Self {
        Self { event_id: format!("{}.{}", component, code), code: code.to_string(), context, fatal }
    }

    pub fn recoverable(&self) -> bool {
        !self.fatal
    }
}

/// Events collected by one verification step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    component: Component,
    events: Vec<Event>,
}

impl Failure {
    pub fn new(component: Component) -> Self {
        Self { component, events: Vec::new() }
    }

    pub fn component(&self) -> Component {
        self.component
    }

    /// Records an event; its id is prefixed with this report's component
    pub fn add_event(&mut self, code: &str, context: Value, fatal: bool) {
        self.events.push(Event::new(self.component, code, context, fatal));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// True when no event was recorded, i.e. the step succeeded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_fatal(&self) -> bool {
        self.events.iter().any(|event| event.fatal)
    }

    /// Appends the events of `other`, keeping their original ids
    pub fn merge(&mut self, other: Failure) {
        self.events.extend(other.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_failure_is_empty() {
        let failure = Failure::new(Component::MeasuredBoot);
        assert!(failure.is_empty());
        assert!(!failure.has_fatal());
        assert_eq!(failure.component(), Component::MeasuredBoot);
    }

    #[test]
    fn test_add_event_prefixes_component() {
        let mut failure = Failure::new(Component::MeasuredBoot);
        failure.add_event("bootlog_evaluation_failed", json!({"reason": false}), true);

        let event = &failure.events()[0];
        assert_eq!(event.event_id, "measured_boot.bootlog_evaluation_failed");
        assert_eq!(event.code, "bootlog_evaluation_failed");
        assert!(!event.recoverable());
        assert!(failure.has_fatal());
    }

    #[test]
    fn test_recoverable_events_only() {
        let mut failure = Failure::new(Component::Ima);
        failure.add_event("hash_mismatch", json!({}), false);
        assert!(!failure.is_empty());
        assert!(!failure.has_fatal());
        assert!(failure.events()[0].recoverable());
    }

    #[test]
    fn test_merge_keeps_event_ids() {
        let mut quote = Failure::new(Component::QuoteValidation);
        quote.add_event("invalid_nonce", json!({}), false);
        let mut boot = Failure::new(Component::MeasuredBoot);
        boot.add_event("upload_opa_policy_failed", json!({}), true);

        quote.merge(boot);
        let ids: Vec<&str> = quote.events().iter().map(|event| event.event_id.as_str()).collect();
        assert_eq!(ids, vec!["quote_validation.invalid_nonce", "measured_boot.upload_opa_policy_failed"]);
        assert!(quote.has_fatal());
    }

    #[test]
    fn test_serialize() {
        let mut failure = Failure::new(Component::PcrValidation);
        failure.add_event("pcr_mismatch", json!({"pcr": 7}), true);

        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["component"], "pcr_validation");
        assert_eq!(value["events"][0]["event_id"], "pcr_validation.pcr_mismatch");
        assert_eq!(value["events"][0]["context"]["pcr"], 7);
        assert_eq!(value["events"][0]["fatal"], true);
    }
}
