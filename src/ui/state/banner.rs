//! Auto-dismiss schedule for transient banners.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::config::DEFAULT_BANNER_DELAY_MS;

pub const DEFAULT_BANNER_DELAY: Duration = Duration::from_millis(DEFAULT_BANNER_DELAY_MS);

/// Tracks one deadline per flag. Any change to the flag vector or the delay
/// throws the whole schedule away and starts again from the current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerTimer {
    flags: Vec<bool>,
    delay: Duration,
    deadlines: Vec<Option<Instant>>,
    mounted: bool,
}

impl Default for BannerTimer {
    fn default() -> Self {
        Self {
            flags: Vec::new(),
            delay: DEFAULT_BANNER_DELAY,
            deadlines: Vec::new(),
            mounted: true,
        }
    }
}

impl BannerTimer {
    /// Returns `true` when the schedule was rebuilt.
    pub fn sync(&mut self, flags: &[bool], delay: Duration, now: Instant) -> bool {
        if !self.mounted || (self.flags == flags && self.delay == delay) {
            return false;
        }
        self.flags = flags.to_vec();
        self.delay = delay;
        self.deadlines = flags
            .iter()
            .map(|flag| flag.then_some(now + delay))
            .collect();
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Indices whose deadline has passed. Each index is returned once.
    pub fn take_due(&mut self, now: Instant) -> Vec<usize> {
        let mut due = Vec::new();
        for (idx, deadline) in self.deadlines.iter_mut().enumerate() {
            if deadline.is_some_and(|at| at <= now) {
                *deadline = None;
                due.push(idx);
            }
        }
        due
    }

    pub fn fire_due(&mut self, now: Instant, setters: &mut [&mut dyn FnMut(bool)]) -> usize {
        let due = self.take_due(now);
        for idx in &due {
            if let Some(setter) = setters.get_mut(*idx) {
                setter(false);
            }
        }
        due.len()
    }

    /// Drops every deadline; later syncs are ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.deadlines.clear();
    }
}

/// One message per truthy flag that has a matching message key, in key order.
pub fn active_alerts(
    external_state: &BTreeMap<String, bool>,
    alert_messages: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    external_state
        .iter()
        .filter(|(_, active)| **active)
        .filter_map(|(key, _)| {
            alert_messages
                .get(key)
                .map(|message| (key.clone(), message.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_true_flags_are_reset_after_the_delay() {
        let mut timer = BannerTimer::default();
        let start = Instant::now();
        let mut calls: Vec<Vec<bool>> = vec![Vec::new(); 3];
        timer.sync(&[true, false, true], DEFAULT_BANNER_DELAY, start);

        let (first, rest) = calls.split_at_mut(1);
        let (second, third) = rest.split_at_mut(1);
        let mut set_first = |value: bool| first[0].push(value);
        let mut set_second = |value: bool| second[0].push(value);
        let mut set_third = |value: bool| third[0].push(value);
        let mut setters: [&mut dyn FnMut(bool); 3] =
            [&mut set_first, &mut set_second, &mut set_third];

        assert_eq!(timer.fire_due(start + Duration::from_millis(4_999), &mut setters), 0);
        assert_eq!(timer.fire_due(start + Duration::from_millis(5_000), &mut setters), 2);
        assert_eq!(timer.fire_due(start + Duration::from_millis(9_000), &mut setters), 0);

        assert_eq!(calls, vec![vec![false], Vec::new(), vec![false]]);
    }

    #[test]
    fn unmount_prevents_every_setter() {
        let mut timer = BannerTimer::default();
        let start = Instant::now();
        let mut fired = 0;
        timer.sync(&[true, true], DEFAULT_BANNER_DELAY, start);

        timer.unmount();
        let mut setter = |_: bool| fired += 1;
        let mut other = |_: bool| {};
        let mut setters: [&mut dyn FnMut(bool); 2] = [&mut setter, &mut other];
        timer.fire_due(start + Duration::from_secs(60), &mut setters);

        assert_eq!(fired, 0);
        assert!(!timer.sync(&[true], DEFAULT_BANNER_DELAY, start));
    }

    #[test]
    fn flag_change_reschedules_from_scratch() {
        let mut timer = BannerTimer::default();
        let start = Instant::now();
        timer.sync(&[true, false], DEFAULT_BANNER_DELAY, start);

        let later = start + Duration::from_secs(3);
        assert!(timer.sync(&[true, true], DEFAULT_BANNER_DELAY, later));
        assert_eq!(timer.take_due(start + DEFAULT_BANNER_DELAY), Vec::<usize>::new());
        assert_eq!(timer.take_due(later + DEFAULT_BANNER_DELAY), vec![0, 1]);
    }

    #[test]
    fn same_flags_keep_the_schedule() {
        let mut timer = BannerTimer::default();
        let start = Instant::now();
        timer.sync(&[true], DEFAULT_BANNER_DELAY, start);

        assert!(!timer.sync(&[true], DEFAULT_BANNER_DELAY, start + Duration::from_secs(1)));
        assert_eq!(timer.next_deadline(), Some(start + DEFAULT_BANNER_DELAY));
    }

    #[test]
    fn alerts_need_a_truthy_flag_and_a_message() {
        let state = BTreeMap::from([
            ("transactionAuthorized".to_string(), true),
            ("invoiceUploaded".to_string(), false),
            ("unknown".to_string(), true),
        ]);
        let messages = BTreeMap::from([
            (
                "transactionAuthorized".to_string(),
                "Transazione autorizzata".to_string(),
            ),
            ("invoiceUploaded".to_string(), "Fattura caricata".to_string()),
        ]);

        assert_eq!(
            active_alerts(&state, &messages),
            vec![(
                "transactionAuthorized".to_string(),
                "Transazione autorizzata".to_string()
            )]
        );
    }
}
