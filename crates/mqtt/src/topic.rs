//! MQTT topic filter matching (`+` matches exactly one level, `#` matches
//! any tail), implemented directly since no corpus crate exposes this as
//! a standalone function — `rumqttc` only matches filters it is itself
//! subscribed with, it does not expose a reusable matcher for picking the
//! first of several configured subscriptions a message topic matches.

pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => continue,
            (Some(f), Some(t)) if f == t => continue,
            (Some(_), _) => return false,
            (None, None) => return true,
            (None, Some(_)) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_matches_exactly_one_level() {
        assert!(topic_matches("gtfsrt/+/tripupdates", "gtfsrt/agency1/tripupdates"));
        assert!(!topic_matches("gtfsrt/+/tripupdates", "gtfsrt/agency1/region2/tripupdates"));
    }

    #[test]
    fn hash_matches_any_tail_including_empty() {
        assert!(topic_matches("gtfsrt/#", "gtfsrt/agency1/tripupdates"));
        assert!(topic_matches("gtfsrt/#", "gtfsrt"));
    }

    #[test]
    fn exact_literal_topics_match_only_themselves() {
        assert!(topic_matches("gtfsrt/alerts", "gtfsrt/alerts"));
        assert!(!topic_matches("gtfsrt/alerts", "gtfsrt/tripupdates"));
    }

    #[test]
    fn shorter_topic_does_not_match_longer_filter() {
        assert!(!topic_matches("gtfsrt/+/tripupdates", "gtfsrt/agency1"));
    }
}
