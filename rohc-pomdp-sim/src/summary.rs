//! Per-session statistics.

use std::fmt;

use rohc_pomdp::{Action, ChannelState, PacketLengths};

use crate::decompressor::ContextState;

/// Outcome of one session, or the average of several.
///
/// Counts are kept as `f64` so averaged summaries stay exact under [`Self::normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    /// Cumulative efficiency after each packet: payload bytes decoded over bytes sent.
    pub efficiency: Vec<f64>,
    pub ir: f64,
    pub fo: f64,
    pub so: f64,
    pub good: f64,
    pub bad: f64,
}

impl SessionSummary {
    /// Summarizes a session from its logs.
    ///
    /// # Parameters
    /// - `packets`: Packet type of each transmission
    /// - `channel`: Channel state each packet was sent over
    /// - `contexts`: Decompressor context before each packet (extra trailing entries are ignored)
    /// - `lengths`: Header and payload lengths
    pub fn from_session(
        packets: &[Action],
        channel: &[ChannelState],
        contexts: &[ContextState],
        lengths: &PacketLengths,
    ) -> Self {
        debug_assert_eq!(packets.len(), channel.len());
        debug_assert!(contexts.len() >= packets.len());

        let mut summary = Self {
            efficiency: Vec::with_capacity(packets.len()),
            ..Self::default()
        };
        let mut sent: u64 = 0;
        let mut decoded: u64 = 0;
        for ((action, state), context) in packets.iter().zip(channel).zip(contexts) {
            match action {
                Action::Ir => summary.ir += 1.0,
                Action::Fo => summary.fo += 1.0,
                Action::So => summary.so += 1.0,
            }
            sent += lengths.total(*action);
            match state {
                ChannelState::Good => {
                    summary.good += 1.0;
                    if context.can_decode(*action) {
                        decoded += u64::from(lengths.payload);
                    }
                }
                ChannelState::Bad => summary.bad += 1.0,
            }
            summary.efficiency.push(decoded as f64 / sent as f64);
        }
        summary
    }

    /// Total packets sent.
    pub fn packets(&self) -> f64 {
        self.ir + self.fo + self.so
    }

    /// Cumulative efficiency over the whole session.
    pub fn final_efficiency(&self) -> f64 {
        self.efficiency.last().copied().unwrap_or(0.0)
    }

    /// Adds `other` into `self`, component-wise.
    pub fn merge(&mut self, other: &SessionSummary) {
        self.ir += other.ir;
        self.fo += other.fo;
        self.so += other.so;
        self.good += other.good;
        self.bad += other.bad;
        if self.efficiency.len() < other.efficiency.len() {
            self.efficiency.resize(other.efficiency.len(), 0.0);
        }
        for (total, value) in self.efficiency.iter_mut().zip(&other.efficiency) {
            *total += value;
        }
    }

    /// Divides every component by `runs`, turning a merged sum into an average.
    pub fn normalize(&mut self, runs: usize) {
        if runs == 0 {
            return;
        }
        let runs = runs as f64;
        self.ir /= runs;
        self.fo /= runs;
        self.so /= runs;
        self.good /= runs;
        self.bad /= runs;
        self.efficiency.iter_mut().for_each(|value| *value /= runs);
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "***** Summary of ROHC session *****")?;
        writeln!(f, "Total number of TBs: {}", self.packets())?;
        writeln!(f, "Type of TBs:")?;
        writeln!(f, " - IR: {}", self.ir)?;
        writeln!(f, " - FO: {}", self.fo)?;
        writeln!(f, " - SO: {}", self.so)?;
        writeln!(f, "Channel states:")?;
        writeln!(f, " - Good: {}", self.good)?;
        writeln!(f, " - Bad: {}", self.bad)?;
        write!(f, "Efficiency: {:.4}", self.final_efficiency())
    }
}

/// Long-run efficiency of sending only `action` packets, ignoring context loss.
pub fn fixed_type_efficiency(lengths: &PacketLengths, action: Action, good_probability: f64) -> f64 {
    good_probability * lengths.efficiency(action)
}

/// CSV of per-packet efficiency curves, one column per named summary.
pub fn efficiency_csv(curves: &[(&str, &SessionSummary)]) -> String {
    let mut csv = String::from("packet");
    for (name, _) in curves {
        csv.push(',');
        csv.push_str(name);
    }
    csv.push('\n');

    let rows = curves
        .iter()
        .map(|(_, summary)| summary.efficiency.len())
        .max()
        .unwrap_or(0);
    for row in 0..rows {
        csv.push_str(&row.to_string());
        for (_, summary) in curves {
            csv.push(',');
            if let Some(value) = summary.efficiency.get(row) {
                csv.push_str(&value.to_string());
            }
        }
        csv.push('\n');
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths() -> PacketLengths {
        PacketLengths {
            header_ir: 80,
            header_fo: 16,
            header_so: 4,
            payload: 20,
        }
    }

    #[test]
    fn efficiency_counts_only_decodable_deliveries() {
        use Action::{Ir, So};
        use ChannelState::{Bad, Good};
        let packets = [So, Ir, Ir, So];
        let channel = [Good, Bad, Good, Good];
        let contexts = [
            ContextState::NoContext,
            ContextState::NoContext,
            ContextState::NoContext,
            ContextState::FullContext { lost: 0 },
            ContextState::FullContext { lost: 0 },
        ];
        let summary = SessionSummary::from_session(&packets, &channel, &contexts, &lengths());

        assert_eq!(summary.ir, 2.0);
        assert_eq!(summary.so, 2.0);
        assert_eq!(summary.fo, 0.0);
        assert_eq!(summary.good, 3.0);
        assert_eq!(summary.bad, 1.0);
        assert_eq!(summary.efficiency[0], 0.0);
        assert_eq!(summary.efficiency[1], 0.0);
        assert_eq!(summary.efficiency[2], 20.0 / 224.0);
        assert_eq!(summary.efficiency[3], 40.0 / 248.0);
    }

    #[test]
    fn merge_then_normalize_averages() {
        let mut total = SessionSummary {
            efficiency: vec![0.2, 0.4],
            ir: 2.0,
            good: 1.0,
            ..SessionSummary::default()
        };
        let other = SessionSummary {
            efficiency: vec![0.4, 0.6],
            so: 2.0,
            bad: 1.0,
            ..SessionSummary::default()
        };
        total.merge(&other);
        total.normalize(2);
        assert!((total.efficiency[0] - 0.3).abs() < 1e-12);
        assert!((total.efficiency[1] - 0.5).abs() < 1e-12);
        assert_eq!(total.ir, 1.0);
        assert_eq!(total.so, 1.0);
        assert_eq!(total.packets(), 2.0);
    }

    #[test]
    fn merge_into_empty_takes_other_length() {
        let mut total = SessionSummary::default();
        total.merge(&SessionSummary {
            efficiency: vec![0.5; 3],
            ..SessionSummary::default()
        });
        assert_eq!(total.efficiency, vec![0.5; 3]);
    }

    #[test]
    fn display_lists_counts() {
        let summary = SessionSummary {
            efficiency: vec![0.5],
            ir: 1.0,
            good: 1.0,
            ..SessionSummary::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("***** Summary of ROHC session *****"));
        assert!(text.contains(" - IR: 1"));
        assert!(text.contains("Efficiency: 0.5000"));
    }

    #[test]
    fn fixed_type_efficiency_scales_by_delivery_rate() {
        let value = fixed_type_efficiency(&lengths(), Action::So, 0.8);
        assert!((value - 0.8 * 20.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn csv_has_header_and_one_row_per_packet() {
        let a = SessionSummary {
            efficiency: vec![0.0, 0.5],
            ..SessionSummary::default()
        };
        let b = SessionSummary {
            efficiency: vec![0.25],
            ..SessionSummary::default()
        };
        let csv = efficiency_csv(&[("timer", &a), ("pomdp", &b)]);
        assert_eq!(csv, "packet,timer,pomdp\n0,0,0.25\n1,0.5,\n");
    }
}
