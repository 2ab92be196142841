//! Launch/attach handshake and the native/emulated restart sequences
//! (§4.5 of spec.md). Kept apart from `session/mod.rs` because the ordering
//! here is subtle enough to deserve reading on its own.

use serde_json::Value;

use super::Session;
use crate::capabilities::Capabilities;
use crate::child::AdapterProcess;
use crate::error::Result;
use crate::protocol::builders;

/// Steps 1-5 of the launch/attach handshake. Shared with emulated restart,
/// which re-runs the same sequence against a freshly spawned adapter and
/// additionally re-arms breakpoints between steps 3 and 4.
fn handshake_steps(session: &mut Session, rearm_before_configuration_done: bool) -> Result<()> {
    let adapter_id = session.launch_params.adapter_id.clone();
    let arguments = session.launch_params.arguments.clone();
    let is_attach = session.launch_params.is_attach;

    // 1. initialize; wait for its response, parse capabilities.
    let init_seq = session.next_seq();
    let init_body = builders::initialize(init_seq, &adapter_id);
    session.write(&init_body)?;
    let init_response = session.await_response(init_seq)?;
    session.capabilities = Capabilities::from_body(&init_response);
    session.exception_filter_catalog = init_response
        .get("exceptionBreakpointFilters")
        .and_then(Value::as_array)
        .map(|filters| {
            filters
                .iter()
                .filter_map(|f| f.get("filter").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    // 2. launch/attach. Per DAP, the adapter answers only after
    // configurationDone arrives, so this response is not awaited yet.
    let launch_seq = session.send_unawaited(|seq| {
        if is_attach {
            builders::attach(seq, arguments.clone())
        } else {
            builders::launch(seq, arguments.clone())
        }
    })?;

    // 3. wait for `initialized`, parking anything else that arrives first.
    session.wait_for_event("initialized")?;

    if rearm_before_configuration_done {
        session.rearm_all()?;
    }

    // 4. configurationDone. Either its own response or the delayed
    // launch/attach response satisfies this step.
    let configuration_done_seq = session.send_unawaited(builders::configuration_done)?;
    session.await_response_one_of(&[configuration_done_seq, launch_seq])?;

    // 5. mark the session initialized.
    session.initialized = true;
    Ok(())
}

/// Run the launch/attach handshake on a just-spawned session.
pub(super) fn run(session: &mut Session) -> Result<()> {
    handshake_steps(session, false)
}

/// Native restart: the adapter keeps its process, its stream, and `seq`
/// keeps counting up. The `restart` response is not explicitly awaited on
/// its own — like `launch`, some adapters delay it until `configurationDone`
/// — so it is accepted interchangeably with `configurationDone`'s response.
pub(super) fn native_restart(session: &mut Session) -> Result<()> {
    let arguments = session.launch_params.arguments.clone();
    let restart_seq = session.send_unawaited(|seq| builders::restart(seq, arguments))?;

    // §3: every restart clears cached frame ids/variables references and the
    // stale per-stop state they were captured alongside, same as a resume.
    session.frames.clear();
    session.thread_id = None;
    session.last_exception = None;

    // Counter a `terminated` event that may race in during the restart.
    session.initialized = true;
    session.wait_for_event("initialized")?;
    session.rearm_all()?;

    let configuration_done_seq = session.send_unawaited(builders::configuration_done)?;
    session.await_response_one_of(&[configuration_done_seq, restart_seq])?;
    session.initialized = true;
    Ok(())
}

/// Emulated restart: no native `restart` support, so the proxy disconnects,
/// reaps the adapter, spawns a replacement, and re-runs the full handshake
/// against it — re-arming breakpoints between `initialized` and
/// `configurationDone` this time, since the fresh adapter knows nothing.
pub(super) fn emulated_restart(session: &mut Session) -> Result<()> {
    let disconnect_seq = session.next_seq();
    let disconnect_body = builders::disconnect(disconnect_seq, Some(true), Some(false), None);
    let _ = session.write(&disconnect_body);
    // Best-effort: the adapter may exit before it gets a chance to answer.
    let _ = session.await_response(disconnect_seq);

    session.process.kill();

    let fresh = AdapterProcess::spawn(&session.launch_params.argv)?;
    session.transport.reset(&fresh)?;
    session.process = fresh;
    session.frames.clear();
    session.thread_id = None;
    session.last_exception = None;
    session.parked.clear();
    session.initialized = false;
    session.seq = 0; // next_seq() hands back 1, matching the restart invariant in §3.

    handshake_steps(session, true)
}
