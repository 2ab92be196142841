//! Capability cache & frame ID map (§4.7 of spec.md).
//!
//! Missing booleans in a `capabilities` body are treated as `false`; the
//! `capabilities` *event* updates only the flags it mentions, leaving every
//! other flag untouched (§4.5).

use serde_json::Value;

macro_rules! capabilities {
    ($($field:ident : $key:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct Capabilities {
            $(pub $field: bool,)+
        }

        impl Capabilities {
            /// Parse from an `initialize` response body. Missing keys are `false`.
            pub fn from_body(body: &Value) -> Self {
                let mut caps = Capabilities::default();
                caps.merge(body);
                caps
            }

            /// Merge a (possibly partial) capabilities object, as delivered by
            /// the `capabilities` event: present keys overwrite, absent keys
            /// are left untouched.
            pub fn merge(&mut self, body: &Value) {
                $(
                    if let Some(v) = body.get($key).and_then(Value::as_bool) {
                        self.$field = v;
                    }
                )+
            }
        }
    };
}

capabilities! {
    supports_conditional_breakpoints: "supportsConditionalBreakpoints",
    supports_hit_conditional_breakpoints: "supportsHitConditionalBreakpoints",
    supports_function_breakpoints: "supportsFunctionBreakpoints",
    supports_data_breakpoints: "supportsDataBreakpoints",
    supports_instruction_breakpoints: "supportsInstructionBreakpoints",
    supports_set_variable: "supportsSetVariable",
    supports_set_expression: "supportsSetExpression",
    supports_goto_targets_request: "supportsGotoTargetsRequest",
    supports_step_in_targets_request: "supportsStepInTargetsRequest",
    supports_read_memory_request: "supportsReadMemoryRequest",
    supports_write_memory_request: "supportsWriteMemoryRequest",
    supports_disassemble_request: "supportsDisassembleRequest",
    supports_modules_request: "supportsModulesRequest",
    supports_loaded_sources_request: "supportsLoadedSourcesRequest",
    supports_completions_request: "supportsCompletionsRequest",
    supports_restart_request: "supportsRestartRequest",
    supports_terminate_request: "supportsTerminateRequest",
    supports_cancel_request: "supportsCancelRequest",
    supports_terminate_threads_request: "supportsTerminateThreadsRequest",
    supports_stepping_granularity: "supportsSteppingGranularity",
    supports_single_thread_execution_requests: "supportsSingleThreadExecutionRequests",
    supports_exception_options: "supportsExceptionOptions",
    supports_exception_filter_options: "supportsExceptionFilterOptions",
    supports_exception_info_request: "supportsExceptionInfoRequest",
    supports_clipboard_context: "supportsClipboardContext",
    supports_delayed_stack_trace_loading: "supportsDelayedStackTraceLoading",
    supports_ansi_styling: "supportsANSIStyling",
    supports_breakpoint_locations_request: "supportsBreakpointLocationsRequest",
    supports_configuration_done_request: "supportsConfigurationDoneRequest",
}

/// Vector of adapter-assigned frame ids from the most recent stopped event,
/// reset every time a `stopped` event arrives.
#[derive(Debug, Clone, Default)]
pub struct FrameIdMap {
    frame_ids: Vec<i64>,
    current_frame_id: Option<i64>,
}

impl FrameIdMap {
    pub fn reset(&mut self, frame_ids: Vec<i64>) {
        self.current_frame_id = frame_ids.first().copied();
        self.frame_ids = frame_ids;
    }

    pub fn clear(&mut self) {
        self.frame_ids.clear();
        self.current_frame_id = None;
    }

    pub fn current_frame_id(&self) -> Option<i64> {
        self.current_frame_id
    }

    /// Resolve a 0-based public frame index to an adapter frame id:
    /// in-range index wins, else fall back to the current frame, else fail.
    pub fn resolve(&self, index: usize) -> Option<i64> {
        self.frame_ids
            .get(index)
            .copied()
            .or(self.current_frame_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_booleans_default_false() {
        let caps = Capabilities::from_body(&json!({}));
        assert!(!caps.supports_restart_request);
    }

    #[test]
    fn from_body_picks_up_present_flags() {
        let caps = Capabilities::from_body(&json!({
            "supportsRestartRequest": true,
            "supportsModulesRequest": false,
        }));
        assert!(caps.supports_restart_request);
        assert!(!caps.supports_modules_request);
    }

    #[test]
    fn property_11_merge_only_touches_named_flags() {
        let mut caps = Capabilities::from_body(&json!({
            "supportsRestartRequest": true,
            "supportsModulesRequest": true,
        }));
        caps.merge(&json!({ "supportsCompletionsRequest": true }));
        assert!(caps.supports_completions_request);
        assert!(caps.supports_restart_request);
        assert!(caps.supports_modules_request);
    }

    #[test]
    fn merge_overwrites_regardless_of_prior_value() {
        let mut caps = Capabilities::from_body(&json!({ "supportsRestartRequest": true }));
        caps.merge(&json!({ "supportsRestartRequest": false }));
        assert!(!caps.supports_restart_request);
    }

    #[test]
    fn property_12_frame_translation() {
        let mut map = FrameIdMap::default();
        map.reset(vec![100, 101, 102]);
        assert_eq!(map.resolve(0), Some(100));
        assert_eq!(map.resolve(2), Some(102));
        assert_eq!(map.resolve(5), Some(100)); // falls back to current = topmost
    }

    #[test]
    fn clear_removes_all_cached_frames() {
        let mut map = FrameIdMap::default();
        map.reset(vec![1, 2, 3]);
        map.clear();
        assert_eq!(map.resolve(0), None);
        assert_eq!(map.current_frame_id(), None);
    }
}
