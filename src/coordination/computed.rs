//! Push-computed policy: report raw facts, adopt the server's verdict.
//!
//! ```text
//!  every status interval   POST /api/v1/status      {device_id, motion, led_sensed, situation}
//!                          GET  /api/v1/relay_state →  200 "1" | "0"
//! ```
//!
//! All cutoff logic lives on the server. The pull runs even when the push
//! failed, so a server that lost one report still drives the relay.

use crate::app::events::AppEvent;
use crate::app::ports::{CoordinationTransport, EventSink, HttpMethod, Millis};
use crate::config::PolicyKind;
use crate::error::{CommsError, RequestFailure};

use super::wire::{self, ComputedStatus, Endpoint, SituationCode};
use super::{push_status, DeviceView, RemoteDecision, SyncDue, SyncOutcome, SyncPolicy};

#[derive(Debug, Default)]
pub struct ComputedPolicy;

impl ComputedPolicy {
    pub fn new() -> Self {
        Self
    }

    fn report(
        view: &DeviceView<'_>,
        transport: &mut impl CoordinationTransport,
        sink: &mut impl EventSink,
    ) -> Result<(), CommsError> {
        let motion = view.presence.active;
        let payload = wire::encode(&ComputedStatus {
            device_id: view.device_id,
            motion,
            led_sensed: view.load_sensed,
            situation: SituationCode::classify(motion, view.load_sensed),
        })?;
        push_status(transport, &payload, sink)
    }

    /// Only a 200 with an exact `1` / `0` body is a decision.
    fn fetch_relay_state(transport: &mut impl CoordinationTransport) -> Result<bool, CommsError> {
        let resp = transport.request(HttpMethod::Get, Endpoint::RelayState.path(), None)?;
        if resp.status != 200 {
            return Err(CommsError::RequestFailed(RequestFailure::Status(resp.status)));
        }
        wire::parse_relay_state(&resp.body)
    }
}

impl SyncPolicy for ComputedPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PushComputed
    }

    fn sync<T, S>(
        &mut self,
        _now: Millis,
        due: SyncDue,
        view: &DeviceView<'_>,
        transport: &mut T,
        sink: &mut S,
    ) -> SyncOutcome
    where
        T: CoordinationTransport,
        S: EventSink,
    {
        let mut outcome = SyncOutcome::default();
        if !due.status {
            return outcome;
        }

        let res = Self::report(view, transport, sink);
        outcome.record(Endpoint::Status, res, sink);

        let res = Self::fetch_relay_state(transport);
        if let Some(on) = outcome.record(Endpoint::RelayState, res, sink) {
            let remote = RemoteDecision::RelayState(on);
            sink.emit(&AppEvent::DecisionReceived(remote));
            outcome.decision = Some(remote.into());
        }

        outcome
    }
}
