//! Breakpoint registry (§4.6, §3 "Breakpoint registry" of spec.md).
//!
//! DAP requires the *entire* current breakpoint set for a file (or for
//! functions, or for exception filters) on every `setBreakpoints`-family
//! request; the public API this registry backs is incremental add/remove.
//! Every mutation therefore re-derives and re-sends the full set for
//! whatever it touched.

use indexmap::IndexMap;

use crate::protocol::builders::{FunctionBreakpointArg, SourceBreakpointArg};

pub type BreakpointId = u32;

#[derive(Debug, Clone)]
pub struct FileBreakpoint {
    pub id: BreakpointId,
    pub line: i64,
    pub condition: Option<String>,
    pub hit_condition: Option<String>,
    pub log_message: Option<String>,
    pub verified: bool,
}

#[derive(Debug, Clone)]
pub struct FunctionBreakpoint {
    pub id: BreakpointId,
    pub name: String,
    pub condition: Option<String>,
    pub verified: bool,
}

#[derive(Debug, Clone)]
pub enum BreakpointInfo {
    File {
        id: BreakpointId,
        file: String,
        line: i64,
        verified: bool,
    },
    Function {
        id: BreakpointId,
        name: String,
        verified: bool,
    },
}

/// What to re-send to the adapter after a mutation. The dispatcher (C5)
/// turns these into actual `setBreakpoints`/`setFunctionBreakpoints`/
/// `setExceptionBreakpoints` requests.
#[derive(Debug, Clone)]
pub enum ReArm {
    File { path: String, breakpoints: Vec<SourceBreakpointArg> },
    Functions(Vec<FunctionBreakpointArg>),
    ExceptionFilters(Vec<String>),
}

#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    files: IndexMap<String, Vec<FileBreakpoint>>,
    by_id: IndexMap<BreakpointId, (String, i64)>,
    functions: Vec<FunctionBreakpoint>,
    exception_filters: Vec<String>,
    next_id: BreakpointId,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> BreakpointId {
        self.next_id += 1;
        self.next_id
    }

    /// Add a file breakpoint; returns its id and the file's full breakpoint
    /// set to re-arm.
    pub fn add_file_breakpoint(
        &mut self,
        file: &str,
        line: i64,
        condition: Option<String>,
        hit_condition: Option<String>,
        log_message: Option<String>,
    ) -> (BreakpointId, ReArm) {
        let id = self.allocate_id();
        self.files.entry(file.to_string()).or_default().push(FileBreakpoint {
            id,
            line,
            condition,
            hit_condition,
            log_message,
            verified: false,
        });
        self.by_id.insert(id, (file.to_string(), line));
        (id, self.rearm_file(file))
    }

    pub fn add_function_breakpoint(
        &mut self,
        name: &str,
        condition: Option<String>,
    ) -> (BreakpointId, ReArm) {
        let id = self.allocate_id();
        self.functions.push(FunctionBreakpoint {
            id,
            name: name.to_string(),
            condition,
            verified: false,
        });
        (id, self.rearm_functions())
    }

    pub fn set_exception_filters(&mut self, filters: Vec<String>) -> ReArm {
        self.exception_filters = filters.clone();
        ReArm::ExceptionFilters(filters)
    }

    /// Remove a breakpoint by local id (file or function). Returns the
    /// re-arm payload for whatever collection it belonged to, or `None` if
    /// the id was unknown.
    pub fn remove(&mut self, id: BreakpointId) -> Option<ReArm> {
        if let Some((file, _line)) = self.by_id.shift_remove(&id) {
            if let Some(entries) = self.files.get_mut(&file) {
                entries.retain(|bp| bp.id != id);
            }
            return Some(self.rearm_file(&file));
        }
        if let Some(pos) = self.functions.iter().position(|f| f.id == id) {
            self.functions.remove(pos);
            return Some(self.rearm_functions());
        }
        None
    }

    /// Mark a file breakpoint verified (from a synchronous `setBreakpoints`
    /// response or an asynchronous `breakpoint` event).
    pub fn mark_file_verified(&mut self, file: &str, line: i64) {
        if let Some(entries) = self.files.get_mut(file) {
            for bp in entries.iter_mut() {
                if bp.line == line {
                    bp.verified = true;
                }
            }
        }
    }

    pub fn mark_function_verified(&mut self, name: &str) {
        for bp in self.functions.iter_mut() {
            if bp.name == name {
                bp.verified = true;
            }
        }
    }

    pub fn list(&self) -> Vec<BreakpointInfo> {
        let mut out = Vec::new();
        for (file, entries) in &self.files {
            for bp in entries {
                out.push(BreakpointInfo::File {
                    id: bp.id,
                    file: file.clone(),
                    line: bp.line,
                    verified: bp.verified,
                });
            }
        }
        for bp in &self.functions {
            out.push(BreakpointInfo::Function {
                id: bp.id,
                name: bp.name.clone(),
                verified: bp.verified,
            });
        }
        out
    }

    pub fn files(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    fn rearm_file(&self, file: &str) -> ReArm {
        let breakpoints = self
            .files
            .get(file)
            .map(|entries| {
                entries
                    .iter()
                    .map(|bp| SourceBreakpointArg {
                        line: bp.line,
                        condition: bp.condition.clone(),
                        hit_condition: bp.hit_condition.clone(),
                        log_message: bp.log_message.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        ReArm::File {
            path: file.to_string(),
            breakpoints,
        }
    }

    fn rearm_functions(&self) -> ReArm {
        ReArm::Functions(
            self.functions
                .iter()
                .map(|bp| FunctionBreakpointArg {
                    name: bp.name.clone(),
                    condition: bp.condition.clone(),
                })
                .collect(),
        )
    }

    /// Every re-arm payload needed to restore state on a fresh adapter:
    /// one per known file, plus function and exception-filter sets.
    pub fn rearm_all(&self) -> Vec<ReArm> {
        let mut out: Vec<ReArm> = self.files.keys().map(|file| self.rearm_file(file)).collect();
        out.push(self.rearm_functions());
        out.push(ReArm::ExceptionFilters(self.exception_filters.clone()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(rearm: &ReArm) -> Vec<i64> {
        match rearm {
            ReArm::File { breakpoints, .. } => breakpoints.iter().map(|bp| bp.line).collect(),
            _ => panic!("expected file re-arm"),
        }
    }

    #[test]
    fn property_9_replace_all_after_add_add_remove() {
        let mut reg = BreakpointRegistry::new();
        let (id10, _) = reg.add_file_breakpoint("file.rs", 10, None, None, None);
        let (_id20, rearm) = reg.add_file_breakpoint("file.rs", 20, None, None, None);
        assert_eq!(lines_of(&rearm), vec![10, 20]);

        let rearm_after_remove = reg.remove(id10).unwrap();
        assert_eq!(lines_of(&rearm_after_remove), vec![20]);
    }

    #[test]
    fn ids_are_stable_across_mutations() {
        let mut reg = BreakpointRegistry::new();
        let (id1, _) = reg.add_file_breakpoint("a.rs", 1, None, None, None);
        let (id2, _) = reg.add_file_breakpoint("a.rs", 2, None, None, None);
        assert_ne!(id1, id2);
        reg.remove(id1);
        let info = reg.list();
        assert_eq!(info.len(), 1);
        match &info[0] {
            BreakpointInfo::File { id, line, .. } => {
                assert_eq!(*id, id2);
                assert_eq!(*line, 2);
            }
            _ => panic!("expected file breakpoint"),
        }
    }

    #[test]
    fn function_breakpoints_replace_all() {
        let mut reg = BreakpointRegistry::new();
        let (id_a, _) = reg.add_function_breakpoint("foo", None);
        let (_id_b, rearm) = reg.add_function_breakpoint("bar", Some("n > 0".to_string()));
        match rearm {
            ReArm::Functions(fns) => {
                assert_eq!(fns.len(), 2);
                assert_eq!(fns[0].name, "foo");
                assert_eq!(fns[1].name, "bar");
                assert_eq!(fns[1].condition.as_deref(), Some("n > 0"));
            }
            _ => panic!("expected function re-arm"),
        }

        let rearm_after_remove = reg.remove(id_a).unwrap();
        match rearm_after_remove {
            ReArm::Functions(fns) => {
                assert_eq!(fns.len(), 1);
                assert_eq!(fns[0].name, "bar");
            }
            _ => panic!("expected function re-arm"),
        }
    }

    #[test]
    fn exception_filters_replace_all() {
        let mut reg = BreakpointRegistry::new();
        let rearm = reg.set_exception_filters(vec!["uncaught".to_string()]);
        match rearm {
            ReArm::ExceptionFilters(filters) => assert_eq!(filters, vec!["uncaught".to_string()]),
            _ => panic!("expected exception filters re-arm"),
        }
        let rearm2 = reg.set_exception_filters(vec!["all".to_string(), "uncaught".to_string()]);
        match rearm2 {
            ReArm::ExceptionFilters(filters) => {
                assert_eq!(filters, vec!["all".to_string(), "uncaught".to_string()])
            }
            _ => panic!("expected exception filters re-arm"),
        }
    }

    #[test]
    fn property_10_rearm_all_covers_every_file_and_set() {
        let mut reg = BreakpointRegistry::new();
        reg.add_file_breakpoint("a.rs", 1, None, None, None);
        reg.add_file_breakpoint("b.rs", 2, None, None, None);
        reg.add_function_breakpoint("main", None);
        reg.set_exception_filters(vec!["uncaught".to_string()]);

        let rearm = reg.rearm_all();
        let file_count = rearm
            .iter()
            .filter(|r| matches!(r, ReArm::File { .. }))
            .count();
        assert_eq!(file_count, 2);
        assert!(rearm.iter().any(|r| matches!(r, ReArm::Functions(_))));
        assert!(rearm
            .iter()
            .any(|r| matches!(r, ReArm::ExceptionFilters(_))));
    }

    #[test]
    fn removing_unknown_id_is_none() {
        let mut reg = BreakpointRegistry::new();
        assert!(reg.remove(999).is_none());
    }

    #[test]
    fn verification_flags_are_independent_per_line() {
        let mut reg = BreakpointRegistry::new();
        reg.add_file_breakpoint("a.rs", 1, None, None, None);
        reg.add_file_breakpoint("a.rs", 2, None, None, None);
        reg.mark_file_verified("a.rs", 1);
        let info = reg.list();
        let verified: Vec<bool> = info
            .iter()
            .map(|b| match b {
                BreakpointInfo::File { verified, .. } => *verified,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(verified, vec![true, false]);
    }
}
