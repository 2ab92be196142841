//! Public driver interface (§4.9 of spec.md): a stable operation table
//! polymorphic over transport variants. Only `Dap` is implemented against a
//! real protocol; the other variants exist so the table shape is fixed, and
//! every operation they cannot serve fails with [`Error::NotSupported`]
//! rather than compiling away.

use serde_json::Value;

use crate::breakpoints::{BreakpointId, BreakpointInfo};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::notifications::Notification;
use crate::session::{Action, InspectRequest, RunOptions, Session, StackFrameInfo, StopState, Variable};

/// A session fronted by a DAP adapter over stdio — the only variant with a
/// full implementation (§1: WebSocket/CDP and native in-process debuggers
/// are future transports plugged into the same table).
pub enum Driver {
    Dap(Session),
    WebSocket,
    Native,
}

macro_rules! dap_only {
    ($self:expr, $what:literal, |$session:ident| $body:expr) => {
        match $self {
            Driver::Dap($session) => $body,
            _ => Err(Error::NotSupported($what)),
        }
    };
}

impl Driver {
    pub fn launch(argv: Vec<String>, adapter_id: String, arguments: Value, config: ProxyConfig) -> Result<Driver> {
        Ok(Driver::Dap(Session::launch(argv, adapter_id, arguments, config)?))
    }

    pub fn attach(argv: Vec<String>, adapter_id: String, arguments: Value, config: ProxyConfig) -> Result<Driver> {
        Ok(Driver::Dap(Session::attach(argv, adapter_id, arguments, config)?))
    }

    pub fn run(&mut self, action: Action, options: RunOptions) -> Result<StopState> {
        dap_only!(self, "run", |s| s.run(action, options))
    }

    pub fn stop(&mut self) -> Result<()> {
        dap_only!(self, "stop", |s| s.stop())
    }

    pub fn detach(&mut self) -> Result<()> {
        dap_only!(self, "detach", |s| s.detach())
    }

    pub fn terminate(&mut self, restart: Option<bool>) -> Result<Value> {
        dap_only!(self, "terminate", |s| s.terminate(restart))
    }

    pub fn restart(&mut self) -> Result<()> {
        dap_only!(self, "restart", |s| s.restart())
    }

    pub fn set_breakpoint(
        &mut self,
        file: &str,
        line: i64,
        condition: Option<String>,
        hit_condition: Option<String>,
        log_message: Option<String>,
    ) -> Result<BreakpointId> {
        dap_only!(self, "set_breakpoint", |s| s.set_breakpoint(
            file,
            line,
            condition,
            hit_condition,
            log_message
        ))
    }

    pub fn remove_breakpoint(&mut self, id: BreakpointId) -> Result<()> {
        dap_only!(self, "remove_breakpoint", |s| s.remove_breakpoint(id))
    }

    pub fn list_breakpoints(&self) -> Result<Vec<BreakpointInfo>> {
        match self {
            Driver::Dap(s) => Ok(s.list_breakpoints()),
            _ => Err(Error::NotSupported("list_breakpoints")),
        }
    }

    pub fn set_function_breakpoint(&mut self, name: &str, condition: Option<String>) -> Result<BreakpointId> {
        dap_only!(self, "set_function_breakpoint", |s| s.set_function_breakpoint(name, condition))
    }

    pub fn set_exception_breakpoints(&mut self, filters: Vec<String>) -> Result<()> {
        dap_only!(self, "set_exception_breakpoints", |s| s.set_exception_breakpoints(filters))
    }

    pub fn set_instruction_breakpoints(&mut self, breakpoints: Value) -> Result<Value> {
        dap_only!(self, "set_instruction_breakpoints", |s| s.set_instruction_breakpoints(breakpoints))
    }

    pub fn set_data_breakpoint(&mut self, breakpoints: Value) -> Result<Value> {
        dap_only!(self, "set_data_breakpoint", |s| s.set_data_breakpoint(breakpoints))
    }

    pub fn data_breakpoint_info(&mut self, arguments: Value) -> Result<Value> {
        dap_only!(self, "data_breakpoint_info", |s| s.data_breakpoint_info(arguments))
    }

    pub fn breakpoint_locations(&mut self, arguments: Value) -> Result<Value> {
        dap_only!(self, "breakpoint_locations", |s| s.breakpoint_locations(arguments))
    }

    pub fn threads(&mut self) -> Result<Value> {
        dap_only!(self, "threads", |s| s.threads())
    }

    pub fn stack_trace(&mut self, thread_id: Option<i64>) -> Result<Vec<StackFrameInfo>> {
        dap_only!(self, "stack_trace", |s| s.stack_trace(thread_id))
    }

    pub fn scopes(&mut self, frame_index: usize) -> Result<Value> {
        dap_only!(self, "scopes", |s| s.scopes(frame_index))
    }

    pub fn inspect(&mut self, request: InspectRequest) -> Result<Vec<Variable>> {
        dap_only!(self, "inspect", |s| s.inspect(request))
    }

    /// `evaluate` is `inspect` with the expression shape (§4.5/§4.9).
    pub fn evaluate(&mut self, expression: &str, frame_index: Option<usize>, context: &str) -> Result<Vec<Variable>> {
        self.inspect(InspectRequest::Expression {
            expression: expression.to_string(),
            frame_index,
            context: context.to_string(),
        })
    }

    pub fn set_variable(&mut self, frame_index: usize, name: &str, value: &str) -> Result<Value> {
        dap_only!(self, "set_variable", |s| s.set_variable(frame_index, name, value))
    }

    pub fn set_expression(&mut self, expression: &str, value: &str, frame_index: Option<usize>) -> Result<Value> {
        dap_only!(self, "set_expression", |s| s.set_expression(expression, value, frame_index))
    }

    pub fn completions(&mut self, text: &str, column: i64, frame_index: Option<usize>) -> Result<Value> {
        dap_only!(self, "completions", |s| s.completions(text, column, frame_index))
    }

    pub fn modules(&mut self, start: Option<i64>, count: Option<i64>) -> Result<Value> {
        dap_only!(self, "modules", |s| s.modules(start, count))
    }

    pub fn loaded_sources(&mut self) -> Result<Value> {
        dap_only!(self, "loaded_sources", |s| s.loaded_sources())
    }

    pub fn source(&mut self, source_reference: i64, path: Option<&str>) -> Result<Value> {
        dap_only!(self, "source", |s| s.source(source_reference, path))
    }

    pub fn step_in_targets(&mut self, frame_index: usize) -> Result<Value> {
        dap_only!(self, "step_in_targets", |s| s.step_in_targets(frame_index))
    }

    pub fn goto_targets(&mut self, path: &str, line: i64) -> Result<Value> {
        dap_only!(self, "goto_targets", |s| s.goto_targets(path, line))
    }

    pub fn goto(&mut self, thread_id: i64, target_id: i64) -> Result<Value> {
        dap_only!(self, "goto", |s| s.goto(thread_id, target_id))
    }

    pub fn restart_frame(&mut self, frame_index: usize) -> Result<Value> {
        dap_only!(self, "restart_frame", |s| s.restart_frame(frame_index))
    }

    pub fn exception_info(&mut self, thread_id: Option<i64>) -> Result<Value> {
        dap_only!(self, "exception_info", |s| s.exception_info(thread_id))
    }

    pub fn read_memory(&mut self, memory_reference: &str, offset: i64, count: i64) -> Result<Value> {
        dap_only!(self, "read_memory", |s| s.read_memory(memory_reference, offset, count))
    }

    pub fn write_memory(&mut self, memory_reference: &str, offset: i64, data: &str) -> Result<Value> {
        dap_only!(self, "write_memory", |s| s.write_memory(memory_reference, offset, data))
    }

    pub fn disassemble(&mut self, memory_reference: &str, instruction_count: i64, offset: i64) -> Result<Value> {
        dap_only!(self, "disassemble", |s| s.disassemble(memory_reference, instruction_count, offset))
    }

    pub fn cancel(&mut self, request_id: Option<i64>, progress_id: Option<&str>) -> Result<Value> {
        dap_only!(self, "cancel", |s| s.cancel(request_id, progress_id))
    }

    pub fn terminate_threads(&mut self, thread_ids: &[i64]) -> Result<()> {
        dap_only!(self, "terminate_threads", |s| s.terminate_threads(thread_ids))
    }

    pub fn capabilities(&self) -> Result<&crate::capabilities::Capabilities> {
        match self {
            Driver::Dap(s) => Ok(s.capabilities()),
            _ => Err(Error::NotSupported("capabilities")),
        }
    }

    pub fn drain_notifications(&mut self) -> Result<Vec<Notification>> {
        match self {
            Driver::Dap(s) => Ok(s.drain_notifications()),
            _ => Err(Error::NotSupported("drain_notifications")),
        }
    }

    pub fn raw_request(&mut self, command: &str, arguments: Value) -> Result<Value> {
        dap_only!(self, "raw_request", |s| s.raw_request(command, arguments))
    }

    pub fn get_pid(&self) -> Result<u32> {
        match self {
            Driver::Dap(s) => Ok(s.get_pid()),
            _ => Err(Error::NotSupported("get_pid")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_dap_variants_report_not_supported() {
        let mut driver = Driver::WebSocket;
        assert!(matches!(driver.threads(), Err(Error::NotSupported("threads"))));
        assert!(matches!(driver.get_pid(), Err(Error::NotSupported("get_pid"))));
    }
}
