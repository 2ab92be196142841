//! DAP request builders (§4.4 of spec.md). Each function is pure: it takes
//! the sequence number and typed arguments and returns a newly-owned JSON
//! string of the shape `{"seq": N, "type": "request", "command": C,
//! "arguments": {...}}`.

use serde_json::{json, Value};

fn request(seq: i64, command: &str, arguments: Value) -> String {
    json!({
        "seq": seq,
        "type": "request",
        "command": command,
        "arguments": arguments,
    })
    .to_string()
}

pub fn initialize(seq: i64, adapter_id: &str) -> String {
    request(
        seq,
        "initialize",
        json!({
            "clientID": "dap-proxy",
            "clientName": "dap-proxy",
            "adapterID": adapter_id,
            "linesStartAt1": true,
            "columnsStartAt1": true,
            "pathFormat": "path",
            "supportsRunInTerminalRequest": true,
            "supportsStartDebuggingRequest": true,
            "supportsProgressReporting": true,
            "supportsInvalidatedEvent": true,
        }),
    )
}

pub fn launch(seq: i64, arguments: Value) -> String {
    request(seq, "launch", arguments)
}

pub fn attach(seq: i64, arguments: Value) -> String {
    request(seq, "attach", arguments)
}

pub fn configuration_done(seq: i64) -> String {
    request(seq, "configurationDone", json!({}))
}

pub fn disconnect(
    seq: i64,
    restart: Option<bool>,
    terminate_debuggee: Option<bool>,
    suspend_debuggee: Option<bool>,
) -> String {
    let mut args = serde_json::Map::new();
    if let Some(v) = restart {
        args.insert("restart".to_string(), json!(v));
    }
    if let Some(v) = terminate_debuggee {
        args.insert("terminateDebuggee".to_string(), json!(v));
    }
    if let Some(v) = suspend_debuggee {
        args.insert("suspendDebuggee".to_string(), json!(v));
    }
    request(seq, "disconnect", Value::Object(args))
}

pub fn terminate(seq: i64, restart: Option<bool>) -> String {
    request(seq, "terminate", json!({ "restart": restart }))
}

pub fn restart(seq: i64, arguments: Value) -> String {
    request(seq, "restart", arguments)
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceBreakpointArg {
    pub line: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "hitCondition", skip_serializing_if = "Option::is_none")]
    pub hit_condition: Option<String>,
    #[serde(rename = "logMessage", skip_serializing_if = "Option::is_none")]
    pub log_message: Option<String>,
}

/// Full-option `setBreakpoints` for one source file: DAP requires the
/// *entire* current set every time (§4.6).
pub fn set_breakpoints(seq: i64, path: &str, breakpoints: &[SourceBreakpointArg]) -> String {
    request(
        seq,
        "setBreakpoints",
        json!({
            "source": { "path": path },
            "breakpoints": breakpoints,
        }),
    )
}

/// Lines-only convenience form, used when no conditions are set.
pub fn set_breakpoints_lines_only(seq: i64, path: &str, lines: &[i64]) -> String {
    request(
        seq,
        "setBreakpoints",
        json!({
            "source": { "path": path },
            "lines": lines,
        }),
    )
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FunctionBreakpointArg {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

pub fn set_function_breakpoints(seq: i64, breakpoints: &[FunctionBreakpointArg]) -> String {
    request(
        seq,
        "setFunctionBreakpoints",
        json!({ "breakpoints": breakpoints }),
    )
}

pub fn set_exception_breakpoints(seq: i64, filters: &[String]) -> String {
    request(
        seq,
        "setExceptionBreakpoints",
        json!({ "filters": filters }),
    )
}

pub fn set_instruction_breakpoints(seq: i64, breakpoints: Value) -> String {
    request(
        seq,
        "setInstructionBreakpoints",
        json!({ "breakpoints": breakpoints }),
    )
}

pub fn set_data_breakpoints(seq: i64, breakpoints: Value) -> String {
    request(
        seq,
        "setDataBreakpoints",
        json!({ "breakpoints": breakpoints }),
    )
}

pub fn data_breakpoint_info(seq: i64, arguments: Value) -> String {
    request(seq, "dataBreakpointInfo", arguments)
}

pub fn breakpoint_locations(seq: i64, arguments: Value) -> String {
    request(seq, "breakpointLocations", arguments)
}

pub fn continue_(seq: i64, thread_id: i64, single_thread: bool) -> String {
    request(
        seq,
        "continue",
        json!({ "threadId": thread_id, "singleThread": single_thread }),
    )
}

pub fn next(seq: i64, thread_id: i64, granularity: Option<&str>) -> String {
    request(
        seq,
        "next",
        json!({ "threadId": thread_id, "granularity": granularity }),
    )
}

pub fn step_in(seq: i64, thread_id: i64, target_id: Option<i64>, granularity: Option<&str>) -> String {
    request(
        seq,
        "stepIn",
        json!({ "threadId": thread_id, "targetId": target_id, "granularity": granularity }),
    )
}

pub fn step_out(seq: i64, thread_id: i64, granularity: Option<&str>) -> String {
    request(
        seq,
        "stepOut",
        json!({ "threadId": thread_id, "granularity": granularity }),
    )
}

pub fn step_back(seq: i64, thread_id: i64, granularity: Option<&str>) -> String {
    request(
        seq,
        "stepBack",
        json!({ "threadId": thread_id, "granularity": granularity }),
    )
}

pub fn reverse_continue(seq: i64, thread_id: i64) -> String {
    request(seq, "reverseContinue", json!({ "threadId": thread_id }))
}

pub fn pause(seq: i64, thread_id: i64) -> String {
    request(seq, "pause", json!({ "threadId": thread_id }))
}

pub fn threads(seq: i64) -> String {
    request(seq, "threads", json!({}))
}

pub fn stack_trace(seq: i64, thread_id: i64, start_frame: i64, levels: i64) -> String {
    request(
        seq,
        "stackTrace",
        json!({ "threadId": thread_id, "startFrame": start_frame, "levels": levels }),
    )
}

pub fn scopes(seq: i64, frame_id: i64) -> String {
    request(seq, "scopes", json!({ "frameId": frame_id }))
}

pub fn variables(seq: i64, variables_reference: i64) -> String {
    request(
        seq,
        "variables",
        json!({ "variablesReference": variables_reference }),
    )
}

pub fn evaluate(seq: i64, expression: &str, frame_id: Option<i64>, context: &str) -> String {
    request(
        seq,
        "evaluate",
        json!({ "expression": expression, "frameId": frame_id, "context": context }),
    )
}

pub fn set_variable(seq: i64, variables_reference: i64, name: &str, value: &str) -> String {
    request(
        seq,
        "setVariable",
        json!({ "variablesReference": variables_reference, "name": name, "value": value }),
    )
}

pub fn set_expression(seq: i64, expression: &str, value: &str, frame_id: Option<i64>) -> String {
    request(
        seq,
        "setExpression",
        json!({ "expression": expression, "value": value, "frameId": frame_id }),
    )
}

pub fn completions(seq: i64, text: &str, column: i64, frame_id: Option<i64>) -> String {
    request(
        seq,
        "completions",
        json!({ "text": text, "column": column, "frameId": frame_id }),
    )
}

pub fn modules(seq: i64, start_module: Option<i64>, module_count: Option<i64>) -> String {
    request(
        seq,
        "modules",
        json!({ "startModule": start_module, "moduleCount": module_count }),
    )
}

pub fn loaded_sources(seq: i64) -> String {
    request(seq, "loadedSources", json!({}))
}

pub fn source(seq: i64, source_reference: i64, path: Option<&str>) -> String {
    request(
        seq,
        "source",
        json!({ "source": { "path": path, "sourceReference": source_reference }, "sourceReference": source_reference }),
    )
}

pub fn read_memory(seq: i64, memory_reference: &str, offset: i64, count: i64) -> String {
    request(
        seq,
        "readMemory",
        json!({ "memoryReference": memory_reference, "offset": offset, "count": count }),
    )
}

pub fn write_memory(seq: i64, memory_reference: &str, offset: i64, data: &str) -> String {
    request(
        seq,
        "writeMemory",
        json!({ "memoryReference": memory_reference, "offset": offset, "data": data }),
    )
}

pub fn disassemble(seq: i64, memory_reference: &str, instruction_count: i64, offset: i64) -> String {
    request(
        seq,
        "disassemble",
        json!({
            "memoryReference": memory_reference,
            "instructionOffset": offset,
            "instructionCount": instruction_count,
        }),
    )
}

pub fn exception_info(seq: i64, thread_id: i64) -> String {
    request(seq, "exceptionInfo", json!({ "threadId": thread_id }))
}

pub fn goto_targets(seq: i64, path: &str, line: i64) -> String {
    request(
        seq,
        "gotoTargets",
        json!({ "source": { "path": path }, "line": line }),
    )
}

pub fn goto(seq: i64, thread_id: i64, target_id: i64) -> String {
    request(
        seq,
        "goto",
        json!({ "threadId": thread_id, "targetId": target_id }),
    )
}

pub fn restart_frame(seq: i64, frame_id: i64) -> String {
    request(seq, "restartFrame", json!({ "frameId": frame_id }))
}

pub fn step_in_targets(seq: i64, frame_id: i64) -> String {
    request(seq, "stepInTargets", json!({ "frameId": frame_id }))
}

pub fn cancel(seq: i64, request_id: Option<i64>, progress_id: Option<&str>) -> String {
    request(
        seq,
        "cancel",
        json!({ "requestId": request_id, "progressId": progress_id }),
    )
}

pub fn terminate_threads(seq: i64, thread_ids: &[i64]) -> String {
    request(seq, "terminateThreads", json!({ "threadIds": thread_ids }))
}

/// Success response to a reverse-request (adapter -> proxy), carrying a
/// fresh seq of its own.
pub fn reverse_request_success(seq: i64, request_seq: i64, command: &str, body: Option<Value>) -> String {
    json!({
        "seq": seq,
        "type": "response",
        "request_seq": request_seq,
        "success": true,
        "command": command,
        "body": body,
    })
    .to_string()
}
