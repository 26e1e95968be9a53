//! Field-by-field merging of config tiers.
//!
//! Mappings merge key by key. Any other value from a higher tier replaces the
//! lower one, lists included. A `null` in a higher tier ("key left blank in
//! the YAML") keeps the lower value.

use serde_json::Value;

/// Lay `tier` over `base` in place.
pub fn merge_tier(base: &mut Value, tier: Value) {
    match (base, tier) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(tier_map)) => {
            for (key, value) in tier_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_tier(slot, value),
                    None if value.is_null() => {}
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Value {
        json!({
            "store": {"db_path": "daily-tasks/tasks.db", "time_zone": "UTC"},
            "mail": {"transport": "outbox", "from": null},
            "daemon": {"tick_seconds": 60}
        })
    }

    #[test]
    fn user_tier_overrides_transport_and_keeps_project_link() {
        let mut merged = defaults();
        merge_tier(
            &mut merged,
            json!({"store": {"sheet_link": "https://sheets.example.com/{sheet_id}"}}),
        );
        merge_tier(&mut merged, json!({"mail": {"transport": "sendmail"}}));

        assert_eq!(merged["mail"]["transport"], "sendmail");
        assert_eq!(
            merged["store"]["sheet_link"],
            "https://sheets.example.com/{sheet_id}"
        );
        assert_eq!(merged["store"]["time_zone"], "UTC");
        assert_eq!(merged["daemon"]["tick_seconds"], 60);
    }

    #[test]
    fn blank_keys_keep_lower_tier_values() {
        let mut merged = defaults();
        merge_tier(&mut merged, json!({"mail": {"from": "team@example.com"}}));
        merge_tier(&mut merged, json!({"mail": {"from": null}, "daemon": null}));

        assert_eq!(merged["mail"]["from"], "team@example.com");
        assert_eq!(merged["daemon"]["tick_seconds"], 60);
    }

    #[test]
    fn blank_key_missing_below_is_not_added() {
        let mut merged = defaults();
        merge_tier(&mut merged, json!({"mail": {"sendmail_path": null}}));
        assert!(merged["mail"].get("sendmail_path").is_none());
    }

    #[test]
    fn lists_are_replaced_not_concatenated() {
        let mut merged = defaults();
        merge_tier(&mut merged, json!({"daemon": {"tick_seconds": [5, 10]}}));
        merge_tier(&mut merged, json!({"daemon": {"tick_seconds": [30]}}));
        assert_eq!(merged["daemon"]["tick_seconds"], json!([30]));
    }
}
