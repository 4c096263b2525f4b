//! One scheduled pass: sanity letters, one check, alerts on DOWN

use crate::courier::{Dispatch, Notifier};
use crate::error::Result;
use crate::manifest::MonitorConfig;
use crate::sickbay::{CheckResult, Probe};
use chrono::Timelike;
use tracing::info;

/// What a pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watch {
    /// Sanity letters delivered
    pub sanity_sent: usize,
    /// Result of the single check
    pub result: CheckResult,
    /// Down alerts delivered
    pub alerts_sent: usize,
}

/// Run one pass at local time `now`
///
/// The target is checked exactly once. Delivery stops at the first failed
/// send and the error is returned.
pub fn run<P, D, T>(
    config: &MonitorConfig,
    probe: &P,
    notifier: &Notifier<D>,
    now: &T,
) -> Result<Watch>
where
    P: Probe,
    D: Dispatch,
    T: Timelike,
{
    let sanity_sent = match config.sanity {
        Some(trigger) if trigger.is_due(now) => {
            info!(trigger = %trigger, "sanity check due");
            send_sanity_round(config, notifier)?
        }
        _ => 0,
    };

    let result = probe.check(&config.url);
    info!(url = %config.url, result = %result, "target checked");

    let alerts_sent = match result {
        CheckResult::Up => 0,
        CheckResult::Down { code } => {
            for recipient in &config.recipients {
                notifier.send_down_alert(&config.url, recipient, code)?;
            }
            config.recipients.len()
        }
    };

    Ok(Watch {
        sanity_sent,
        result,
        alerts_sent,
    })
}

/// Send the sanity letter to every recipient, regardless of the time
pub fn send_sanity_round<D: Dispatch>(config: &MonitorConfig, notifier: &Notifier<D>) -> Result<usize> {
    for recipient in &config.recipients {
        notifier.send_sanity_check(recipient)?;
    }
    Ok(config.recipients.len())
}
