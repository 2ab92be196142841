//! Session state machine & dispatcher (§4.5, §3 "Session" of spec.md).
//!
//! Everything here runs on one call stack: there is no background reader.
//! A public operation sends a request and then drives the read loop itself
//! until the thing it is waiting for (a correlated response, or a specific
//! event) shows up, parking anything else along the way.

mod handshake;

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};
use serde_json::Value;

use crate::breakpoints::{BreakpointId, BreakpointInfo, BreakpointRegistry, ReArm};
use crate::capabilities::{Capabilities, FrameIdMap};
use crate::child::AdapterProcess;
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::notifications::{Notification, NotificationQueue};
use crate::protocol::builders;
use crate::protocol::types::{self, MessageKind};
use crate::trace::FileTracer;
use crate::transport::Transport;

/// What the caller asked `run` to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    StepInto,
    StepOver,
    StepOut,
    StepBack,
    ReverseContinue,
    Pause,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Statement,
    Line,
    Instruction,
}

impl Granularity {
    fn as_dap_str(self) -> &'static str {
        match self {
            Granularity::Statement => "statement",
            Granularity::Line => "line",
            Granularity::Instruction => "instruction",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub granularity: Option<Granularity>,
    pub target_id: Option<i64>,
    pub thread_id: Option<i64>,
    pub single_thread: bool,
}

#[derive(Debug, Clone)]
pub struct StackFrameInfo {
    pub index: usize,
    pub dap_frame_id: i64,
    pub name: String,
    pub file: Option<String>,
    pub line: Option<i64>,
    pub column: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StopState {
    pub reason: String,
    pub exit_code: Option<i64>,
    pub hit_breakpoint_ids: Vec<i64>,
    pub stack_trace: Vec<StackFrameInfo>,
    pub output: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub variables_reference: i64,
    pub type_name: Option<String>,
}

/// The three shapes `inspect` accepts (§4.5).
#[derive(Debug, Clone)]
pub enum InspectRequest {
    Variables(i64),
    Scope { frame_index: Option<usize>, scope: String },
    Expression { expression: String, frame_index: Option<usize>, context: String },
}

/// Saved at launch/attach time so an emulated restart can re-run the
/// handshake against a fresh process with the same arguments.
#[derive(Debug, Clone)]
struct LaunchParams {
    argv: Vec<String>,
    adapter_id: String,
    arguments: Value,
    is_attach: bool,
}

pub struct Session {
    process: AdapterProcess,
    transport: Transport,
    config: ProxyConfig,
    tracer: Option<FileTracer>,

    seq: i64,
    thread_id: Option<i64>,
    frames: FrameIdMap,
    initialized: bool,
    breakpoints: BreakpointRegistry,
    capabilities: Capabilities,
    exception_filter_catalog: Vec<String>,
    notifications: NotificationQueue,
    parked: HashMap<String, VecDeque<Value>>,

    output_buffer: Vec<(String, String)>,
    loaded_modules: Vec<Value>,
    memory_events: HashMap<String, Value>,
    progress: HashMap<String, Value>,
    invalidated_areas: Vec<String>,
    last_exception: Option<Value>,

    launch_params: LaunchParams,
}

/// Map a DAP event name to the notification method it is surfaced under, or
/// `None` if it is not one of the recognized names (§4.5 / §6).
fn known_event_method(event: &str) -> Option<&'static str> {
    Some(match event {
        "stopped" => "debug/stopped",
        "output" => "debug/output",
        "breakpoint" => "debug/breakpoint_verified",
        "module" => "debug/module",
        "continued" => "debug/continued",
        "thread" => "debug/thread",
        "loadedSource" => "debug/loaded_source",
        "process" => "debug/process",
        "capabilities" => "debug/capabilities_changed",
        "memory" => "debug/memory_changed",
        "progressStart" | "progressUpdate" | "progressEnd" => "debug/progress",
        "exited" => "debug/exited",
        "terminated" => "debug/terminated",
        "invalidated" => "debug/invalidated",
        _ => return None,
    })
}

impl Session {
    /// Spawn the adapter and run the `launch` handshake (§4.5 steps 1-5).
    pub fn launch(
        argv: Vec<String>,
        adapter_id: String,
        arguments: Value,
        config: ProxyConfig,
    ) -> Result<Self> {
        let mut session = Self::spawn(
            argv,
            LaunchParams { adapter_id, arguments, is_attach: false, argv: Vec::new() },
            config,
        )?;
        handshake::run(&mut session)?;
        Ok(session)
    }

    /// Spawn the adapter and run the `attach` handshake.
    pub fn attach(
        argv: Vec<String>,
        adapter_id: String,
        arguments: Value,
        config: ProxyConfig,
    ) -> Result<Self> {
        let mut session = Self::spawn(
            argv,
            LaunchParams { adapter_id, arguments, is_attach: true, argv: Vec::new() },
            config,
        )?;
        handshake::run(&mut session)?;
        Ok(session)
    }

    fn spawn(argv: Vec<String>, mut launch_params: LaunchParams, config: ProxyConfig) -> Result<Self> {
        let process = AdapterProcess::spawn(&argv)?;
        let transport = Transport::new(&process, config.read_timeout)?;
        let tracer = match &config.trace_log {
            Some(path) => Some(FileTracer::new(path)?),
            None => None,
        };
        launch_params.argv = argv;
        Ok(Session {
            process,
            transport,
            config,
            tracer,
            seq: 0,
            thread_id: None,
            frames: FrameIdMap::default(),
            initialized: false,
            breakpoints: BreakpointRegistry::new(),
            capabilities: Capabilities::default(),
            exception_filter_catalog: Vec::new(),
            notifications: NotificationQueue::new(),
            parked: HashMap::new(),
            output_buffer: Vec::new(),
            loaded_modules: Vec::new(),
            memory_events: HashMap::new(),
            progress: HashMap::new(),
            invalidated_areas: Vec::new(),
            launch_params,
        })
    }

    fn next_seq(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn trace(&self, direction: &str, body: &str) {
        if let Some(tracer) = &self.tracer {
            tracer.line(&format!("{direction} {body}"));
        }
    }

    fn write(&mut self, body: &str) -> Result<()> {
        self.trace("->", body);
        self.transport.write_message(body)
    }

    fn read(&mut self) -> Result<String> {
        let raw = self.transport.read_message()?;
        self.trace("<-", &raw);
        Ok(raw)
    }

    /// Build and send a request via `build(seq)`, then await its response.
    fn send(&mut self, build: impl FnOnce(i64) -> String) -> Result<Value> {
        let seq = self.next_seq();
        let body = build(seq);
        self.write(&body)?;
        self.await_response(seq)
    }

    /// Send without awaiting — used for `launch`/`attach`/`restart`, whose
    /// response is accepted later alongside another one (§4.5).
    fn send_unawaited(&mut self, build: impl FnOnce(i64) -> String) -> Result<i64> {
        let seq = self.next_seq();
        let body = build(seq);
        self.write(&body)?;
        Ok(seq)
    }

    fn apply_event_side_effects(&mut self, event: &str, body: &Value) {
        match event {
            "stopped" => {
                if let Some(tid) = body.get("threadId").and_then(Value::as_i64) {
                    self.thread_id = Some(tid);
                }
            }
            "output" => {
                let category = body
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or("console")
                    .to_string();
                if let Some(text) = body.get("output").and_then(Value::as_str) {
                    if !text.is_empty() {
                        self.output_buffer.push((category, text.to_string()));
                    }
                }
            }
            "terminated" => {
                self.initialized = false;
            }
            "capabilities" => {
                if let Some(caps) = body.get("capabilities") {
                    self.capabilities.merge(caps);
                }
            }
            "module" => {
                let reason = body.get("reason").and_then(Value::as_str).unwrap_or("");
                if (reason == "new" || reason == "changed") && body.get("module").is_some() {
                    self.loaded_modules.push(body["module"].clone());
                }
            }
            "memory" => {
                if let Some(reference) = body.get("memoryReference").and_then(Value::as_str) {
                    self.memory_events.insert(reference.to_string(), body.clone());
                }
            }
            "invalidated" => {
                if let Some(areas) = body.get("areas").and_then(Value::as_array) {
                    self.invalidated_areas = areas
                        .iter()
                        .filter_map(|a| a.as_str().map(str::to_string))
                        .collect();
                }
            }
            "progressStart" | "progressUpdate" | "progressEnd" => {
                if let Some(id) = body.get("progressId").and_then(Value::as_str) {
                    self.progress.insert(id.to_string(), body.clone());
                }
            }
            // "breakpoint": deliberately not mutating the registry here — all
            // local verification flags are set eagerly on the synchronous
            // setBreakpoints response (apply_rearm), per §4.5.
            _ => {}
        }
    }

    fn park(&mut self, event: String, body: Value) {
        self.parked.entry(event).or_default().push_back(body);
    }

    fn handle_reverse_request(&mut self, command: &str, arguments: Value, incoming_seq: i64) -> Result<()> {
        match command {
            "startDebugging" => self.notifications.push("debug/start_debugging", arguments),
            "runInTerminal" => self.notifications.push("debug/run_in_terminal", arguments),
            other => debug!(target: "dap_proxy", "unrecognized reverse request {other}, acking anyway"),
        }
        let seq = self.next_seq();
        let response = builders::reverse_request_success(seq, incoming_seq, command, None);
        self.write(&response)
    }

    /// Read messages until the response for `expected_seq` arrives. Every
    /// event seen along the way gets its inline handler run, is enqueued if
    /// it is a known name, and is unconditionally parked (nothing here is
    /// "awaited" by name).
    fn await_response(&mut self, expected_seq: i64) -> Result<Value> {
        loop {
            let raw = self.read()?;
            let msg = types::parse(&raw)?;
            match msg.kind {
                MessageKind::Response { request_seq, success, command, message, body } => {
                    if request_seq != expected_seq {
                        warn!(target: "dap_proxy", "discarding stale response to {command} (request_seq={request_seq}, awaited={expected_seq})");
                        continue;
                    }
                    return if success {
                        Ok(body)
                    } else {
                        Err(Error::Adapter { command, message: message.unwrap_or_default() })
                    };
                }
                MessageKind::Event { event, body } => {
                    self.apply_event_side_effects(&event, &body);
                    if let Some(method) = known_event_method(&event) {
                        self.notifications.push(method, body.clone());
                    }
                    self.park(event, body);
                }
                MessageKind::Request { command, arguments } => {
                    self.handle_reverse_request(&command, arguments, msg.seq)?;
                }
            }
        }
    }

    /// Same as [`Session::await_response`] but accepts any of several
    /// outstanding sequence numbers (used by the handshake, where either the
    /// `configurationDone` or the delayed `launch`/`attach` response is
    /// acceptable — §4.5 step 4).
    fn await_response_one_of(&mut self, expected: &[i64]) -> Result<(i64, Value)> {
        loop {
            let raw = self.read()?;
            let msg = types::parse(&raw)?;
            match msg.kind {
                MessageKind::Response { request_seq, success, command, message, body } => {
                    if !expected.contains(&request_seq) {
                        warn!(target: "dap_proxy", "discarding stale response to {command} (request_seq={request_seq})");
                        continue;
                    }
                    return if success {
                        Ok((request_seq, body))
                    } else {
                        Err(Error::Adapter { command, message: message.unwrap_or_default() })
                    };
                }
                MessageKind::Event { event, body } => {
                    self.apply_event_side_effects(&event, &body);
                    if let Some(method) = known_event_method(&event) {
                        self.notifications.push(method, body.clone());
                    }
                    self.park(event, body);
                }
                MessageKind::Request { command, arguments } => {
                    self.handle_reverse_request(&command, arguments, msg.seq)?;
                }
            }
        }
    }

    /// Wait for a specific event name, returning the earliest parked match
    /// before reading anything further from the wire.
    fn wait_for_event(&mut self, name: &str) -> Result<Value> {
        self.wait_for_event_any(&[name]).map(|(_, body)| body)
    }

    fn wait_for_event_any(&mut self, names: &[&'static str]) -> Result<(&'static str, Value)> {
        for name in names {
            if let Some(queue) = self.parked.get_mut(*name) {
                if let Some(body) = queue.pop_front() {
                    return Ok((name, body));
                }
            }
        }
        loop {
            let raw = self.read()?;
            let msg = types::parse(&raw)?;
            match msg.kind {
                MessageKind::Event { event, body } => {
                    self.apply_event_side_effects(&event, &body);
                    if let Some(method) = known_event_method(&event) {
                        self.notifications.push(method, body.clone());
                    }
                    if let Some(&matched) = names.iter().find(|n| **n == event) {
                        return Ok((matched, body));
                    }
                    self.park(event, body);
                }
                MessageKind::Request { command, arguments } => {
                    self.handle_reverse_request(&command, arguments, msg.seq)?;
                }
                MessageKind::Response { command, .. } => {
                    warn!(target: "dap_proxy", "unexpected response to {command} while waiting for an event");
                }
            }
        }
    }

    fn take_output(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.output_buffer)
    }

    // ---------------------------------------------------------------- run

    pub fn run(&mut self, action: Action, options: RunOptions) -> Result<StopState> {
        if action == Action::Restart {
            self.restart()?;
            return Ok(StopState {
                reason: "restart".to_string(),
                exit_code: None,
                hit_breakpoint_ids: Vec::new(),
                stack_trace: Vec::new(),
                output: self.take_output(),
            });
        }

        let thread_id = options.thread_id.or(self.thread_id).unwrap_or(0);
        let granularity = options.granularity.map(Granularity::as_dap_str);
        match action {
            Action::Continue => {
                self.send(|seq| builders::continue_(seq, thread_id, options.single_thread))?;
            }
            Action::StepOver => {
                self.send(|seq| builders::next(seq, thread_id, granularity))?;
            }
            Action::StepInto => {
                self.send(|seq| builders::step_in(seq, thread_id, options.target_id, granularity))?;
            }
            Action::StepOut => {
                self.send(|seq| builders::step_out(seq, thread_id, granularity))?;
            }
            Action::StepBack => {
                self.send(|seq| builders::step_back(seq, thread_id, granularity))?;
            }
            Action::ReverseContinue => {
                self.send(|seq| builders::reverse_continue(seq, thread_id))?;
            }
            Action::Pause => {
                self.send(|seq| builders::pause(seq, thread_id))?;
            }
            Action::Restart => unreachable!("handled above"),
        }

        // A resume invalidates every cached frame id and variables reference.
        self.frames.clear();

        let (name, body) = self.wait_for_event_any(&["stopped", "exited"])?;
        if name == "exited" {
            let exit_code = body.get("exitCode").and_then(Value::as_i64);
            return Ok(StopState {
                reason: "exited".to_string(),
                exit_code,
                hit_breakpoint_ids: Vec::new(),
                stack_trace: Vec::new(),
                output: self.take_output(),
            });
        }

        let reason = body.get("reason").and_then(Value::as_str).unwrap_or("").to_string();
        let hit_breakpoint_ids = body
            .get("hitBreakpointIds")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        let stopped_thread = body.get("threadId").and_then(Value::as_i64).unwrap_or(thread_id);

        let levels = self.config.stack_trace_levels;
        let trace_body = self.send(|seq| builders::stack_trace(seq, stopped_thread, 0, levels))?;
        let stack_trace = parse_stack_frames(&trace_body)?;
        self.frames.reset(stack_trace.iter().map(|f| f.dap_frame_id).collect());

        Ok(StopState {
            reason,
            exit_code: None,
            hit_breakpoint_ids,
            stack_trace,
            output: self.take_output(),
        })
    }

    fn resolve_frame(&self, index: Option<usize>) -> Result<i64> {
        match index {
            Some(i) => self.frames.resolve(i).ok_or(Error::InvalidResponse("no cached stack frame".to_string())),
            None => self.frames.current_frame_id().ok_or(Error::InvalidResponse("no cached stack frame".to_string())),
        }
    }

    // ------------------------------------------------------------ inspect

    pub fn inspect(&mut self, request: InspectRequest) -> Result<Vec<Variable>> {
        match request {
            InspectRequest::Variables(variables_reference) => {
                let body = self.send(|seq| builders::variables(seq, variables_reference))?;
                parse_variables(&body)
            }
            InspectRequest::Scope { frame_index, scope } => {
                let frame_id = self.resolve_frame(frame_index)?;
                let scopes_body = self.send(|seq| builders::scopes(seq, frame_id))?;
                let scopes = scopes_body.get("scopes").and_then(Value::as_array).cloned().unwrap_or_default();
                let wanted = scope.to_lowercase();
                let matched = scopes
                    .iter()
                    .find(|s| {
                        let name = s.get("name").and_then(Value::as_str).unwrap_or("").to_lowercase();
                        name == wanted || (wanted.contains("arg") && name.contains("arg"))
                    })
                    .ok_or_else(|| Error::InvalidResponse(format!("no scope named {scope}")))?;
                let variables_reference = matched.get("variablesReference").and_then(Value::as_i64).unwrap_or(0);
                let body = self.send(|seq| builders::variables(seq, variables_reference))?;
                parse_variables(&body)
            }
            InspectRequest::Expression { expression, frame_index, context } => {
                let frame_id = match frame_index {
                    Some(i) => Some(self.resolve_frame(Some(i))?),
                    None => self.frames.current_frame_id(),
                };
                let body = self.send(|seq| builders::evaluate(seq, &expression, frame_id, &context))?;
                let mut result = vec![Variable {
                    name: expression,
                    value: body.get("result").and_then(Value::as_str).unwrap_or_default().to_string(),
                    variables_reference: body.get("variablesReference").and_then(Value::as_i64).unwrap_or(0),
                    type_name: body.get("type").and_then(Value::as_str).map(str::to_string),
                }];
                let variables_reference = body.get("variablesReference").and_then(Value::as_i64).unwrap_or(0);
                if variables_reference != 0 {
                    let children = self.send(|seq| builders::variables(seq, variables_reference))?;
                    result.extend(parse_variables(&children)?);
                }
                Ok(result)
            }
        }
    }

    pub fn set_variable(&mut self, frame_index: usize, name: &str, value: &str) -> Result<Value> {
        let frame_id = if frame_index == 0 {
            self.frames.current_frame_id().ok_or(Error::NotInitialized)?
        } else {
            self.resolve_frame(Some(frame_index))?
        };
        let scopes_body = self.send(|seq| builders::scopes(seq, frame_id))?;
        let first_scope = scopes_body
            .get("scopes")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .ok_or_else(|| Error::InvalidResponse("adapter returned no scopes".to_string()))?;
        let variables_reference = first_scope.get("variablesReference").and_then(Value::as_i64).unwrap_or(0);
        self.send(|seq| builders::set_variable(seq, variables_reference, name, value))
    }

    pub fn set_expression(&mut self, expression: &str, value: &str, frame_index: Option<usize>) -> Result<Value> {
        let frame_id = match frame_index {
            Some(i) => Some(self.resolve_frame(Some(i))?),
            None => self.frames.current_frame_id(),
        };
        self.send(|seq| builders::set_expression(seq, expression, value, frame_id))
    }

    // --------------------------------------------------------- breakpoints

    fn apply_rearm(&mut self, rearm: &ReArm) -> Result<()> {
        match rearm {
            ReArm::File { path, breakpoints } => {
                let _ = self.send(|seq| builders::set_breakpoints(seq, path, breakpoints))?;
                for bp in breakpoints {
                    self.breakpoints.mark_file_verified(path, bp.line);
                }
            }
            ReArm::Functions(functions) => {
                let _ = self.send(|seq| builders::set_function_breakpoints(seq, functions))?;
                for f in functions {
                    self.breakpoints.mark_function_verified(&f.name);
                }
            }
            ReArm::ExceptionFilters(filters) => {
                let _ = self.send(|seq| builders::set_exception_breakpoints(seq, filters))?;
            }
        }
        Ok(())
    }

    pub fn set_breakpoint(
        &mut self,
        file: &str,
        line: i64,
        condition: Option<String>,
        hit_condition: Option<String>,
        log_message: Option<String>,
    ) -> Result<BreakpointId> {
        let (id, rearm) = self.breakpoints.add_file_breakpoint(file, line, condition, hit_condition, log_message);
        self.apply_rearm(&rearm)?;
        Ok(id)
    }

    pub fn set_function_breakpoint(&mut self, name: &str, condition: Option<String>) -> Result<BreakpointId> {
        let (id, rearm) = self.breakpoints.add_function_breakpoint(name, condition);
        self.apply_rearm(&rearm)?;
        Ok(id)
    }

    pub fn remove_breakpoint(&mut self, id: BreakpointId) -> Result<()> {
        if let Some(rearm) = self.breakpoints.remove(id) {
            self.apply_rearm(&rearm)?;
        }
        Ok(())
    }

    pub fn list_breakpoints(&self) -> Vec<BreakpointInfo> {
        self.breakpoints.list()
    }

    pub fn set_exception_breakpoints(&mut self, filters: Vec<String>) -> Result<()> {
        let rearm = self.breakpoints.set_exception_filters(filters);
        self.apply_rearm(&rearm)
    }

    pub fn exception_filter_catalog(&self) -> &[String] {
        &self.exception_filter_catalog
    }

    pub fn set_instruction_breakpoints(&mut self, breakpoints: Value) -> Result<Value> {
        self.send(|seq| builders::set_instruction_breakpoints(seq, breakpoints))
    }

    pub fn set_data_breakpoint(&mut self, breakpoints: Value) -> Result<Value> {
        self.send(|seq| builders::set_data_breakpoints(seq, breakpoints))
    }

    pub fn data_breakpoint_info(&mut self, arguments: Value) -> Result<Value> {
        self.send(|seq| builders::data_breakpoint_info(seq, arguments))
    }

    pub fn breakpoint_locations(&mut self, arguments: Value) -> Result<Value> {
        self.send(|seq| builders::breakpoint_locations(seq, arguments))
    }

    fn rearm_all(&mut self) -> Result<()> {
        for rearm in self.breakpoints.rearm_all() {
            self.apply_rearm(&rearm)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------ threads

    pub fn threads(&mut self) -> Result<Value> {
        self.send(builders::threads)
    }

    pub fn stack_trace(&mut self, thread_id: Option<i64>) -> Result<Vec<StackFrameInfo>> {
        let thread_id = thread_id.or(self.thread_id).unwrap_or(0);
        let levels = self.config.stack_trace_levels;
        let body = self.send(|seq| builders::stack_trace(seq, thread_id, 0, levels))?;
        let frames = parse_stack_frames(&body)?;
        self.frames.reset(frames.iter().map(|f| f.dap_frame_id).collect());
        Ok(frames)
    }

    pub fn scopes(&mut self, frame_index: usize) -> Result<Value> {
        let frame_id = self.resolve_frame(Some(frame_index))?;
        self.send(|seq| builders::scopes(seq, frame_id))
    }

    // ------------------------------------------------------------- misc

    pub fn completions(&mut self, text: &str, column: i64, frame_index: Option<usize>) -> Result<Value> {
        let frame_id = match frame_index {
            Some(i) => Some(self.resolve_frame(Some(i))?),
            None => self.frames.current_frame_id(),
        };
        self.send(|seq| builders::completions(seq, text, column, frame_id))
    }

    pub fn modules(&mut self, start: Option<i64>, count: Option<i64>) -> Result<Value> {
        self.send(|seq| builders::modules(seq, start, count))
    }

    pub fn loaded_sources(&mut self) -> Result<Value> {
        self.send(builders::loaded_sources)
    }

    pub fn source(&mut self, source_reference: i64, path: Option<&str>) -> Result<Value> {
        self.send(|seq| builders::source(seq, source_reference, path))
    }

    pub fn step_in_targets(&mut self, frame_index: usize) -> Result<Value> {
        let frame_id = self.resolve_frame(Some(frame_index))?;
        self.send(|seq| builders::step_in_targets(seq, frame_id))
    }

    pub fn goto_targets(&mut self, path: &str, line: i64) -> Result<Value> {
        self.send(|seq| builders::goto_targets(seq, path, line))
    }

    pub fn goto(&mut self, thread_id: i64, target_id: i64) -> Result<Value> {
        self.frames.clear();
        self.send(|seq| builders::goto(seq, thread_id, target_id))
    }

    pub fn restart_frame(&mut self, frame_index: usize) -> Result<Value> {
        let frame_id = self.resolve_frame(Some(frame_index))?;
        self.send(|seq| builders::restart_frame(seq, frame_id))
    }

    pub fn exception_info(&mut self, thread_id: Option<i64>) -> Result<Value> {
        let thread_id = thread_id.or(self.thread_id).unwrap_or(0);
        let body = self.send(|seq| builders::exception_info(seq, thread_id))?;
        self.last_exception = Some(body.clone());
        Ok(body)
    }

    pub fn last_exception(&self) -> Option<&Value> {
        self.last_exception.as_ref()
    }

    pub fn read_memory(&mut self, memory_reference: &str, offset: i64, count: i64) -> Result<Value> {
        self.send(|seq| builders::read_memory(seq, memory_reference, offset, count))
    }

    pub fn write_memory(&mut self, memory_reference: &str, offset: i64, data: &str) -> Result<Value> {
        self.send(|seq| builders::write_memory(seq, memory_reference, offset, data))
    }

    pub fn disassemble(&mut self, memory_reference: &str, instruction_count: i64, offset: i64) -> Result<Value> {
        self.send(|seq| builders::disassemble(seq, memory_reference, instruction_count, offset))
    }

    pub fn cancel(&mut self, request_id: Option<i64>, progress_id: Option<&str>) -> Result<Value> {
        self.send(|seq| builders::cancel(seq, request_id, progress_id))
    }

    pub fn terminate_threads(&mut self, thread_ids: &[i64]) -> Result<()> {
        self.send(|seq| builders::terminate_threads(seq, thread_ids))?;
        Ok(())
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn raw_request(&mut self, command: &str, arguments: Value) -> Result<Value> {
        let command = command.to_string();
        self.send(move |seq| {
            serde_json::json!({
                "seq": seq,
                "type": "request",
                "command": command,
                "arguments": arguments,
            })
            .to_string()
        })
    }

    pub fn get_pid(&self) -> u32 {
        self.process.pid()
    }

    // ------------------------------------------------------------ restart

    pub fn restart(&mut self) -> Result<()> {
        if self.capabilities.supports_restart_request {
            handshake::native_restart(self)
        } else {
            handshake::emulated_restart(self)
        }
    }

    pub fn terminate(&mut self, restart: Option<bool>) -> Result<Value> {
        self.send(|seq| builders::terminate(seq, restart))
    }

    /// `stop`: tear the session down unconditionally, killing the debuggee.
    pub fn stop(&mut self) -> Result<()> {
        let seq = self.next_seq();
        let body = builders::disconnect(seq, Some(false), Some(true), None);
        let _ = self.write(&body);
        let _ = self.await_response(seq);
        self.process.kill();
        Ok(())
    }

    /// `detach`: tear the session down without killing the debuggee.
    pub fn detach(&mut self) -> Result<()> {
        let seq = self.next_seq();
        let body = builders::disconnect(seq, Some(false), Some(false), None);
        let _ = self.write(&body);
        let _ = self.await_response(seq);
        self.process.kill();
        Ok(())
    }
}

fn parse_stack_frames(body: &Value) -> Result<Vec<StackFrameInfo>> {
    let frames = body
        .get("stackFrames")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidResponse("stackTrace response missing stackFrames".to_string()))?;
    Ok(frames
        .iter()
        .enumerate()
        .map(|(index, frame)| StackFrameInfo {
            index,
            dap_frame_id: frame.get("id").and_then(Value::as_i64).unwrap_or(0),
            name: frame.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
            file: frame.get("source").and_then(|s| s.get("path")).and_then(Value::as_str).map(str::to_string),
            line: frame.get("line").and_then(Value::as_i64),
            column: frame.get("column").and_then(Value::as_i64),
        })
        .collect())
}

fn parse_variables(body: &Value) -> Result<Vec<Variable>> {
    let variables = body
        .get("variables")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidResponse("variables response missing variables".to_string()))?;
    Ok(variables
        .iter()
        .map(|v| Variable {
            name: v.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
            value: v.get("value").and_then(Value::as_str).unwrap_or_default().to_string(),
            variables_reference: v.get("variablesReference").and_then(Value::as_i64).unwrap_or(0),
            type_name: v.get("type").and_then(Value::as_str).map(str::to_string),
        })
        .collect())
}
