//! Instruction emitter.
//!
//! [`Emitter`] appends pseudo-instructions and hands out fresh temporaries
//! and labels. Temporaries and locals are frame slots allocated downward from
//! the local base; the emitter counts how many bytes the current function has
//! actually used so the frame-size estimate can be held to its bound.
//!
//! Label and temporary counters run across the whole program and are never
//! reset, so names are unique and a rerun produces the same stream.

use decaf_core::TargetLayout;
use ordered_float::OrderedFloat;

use super::instr::{Builtin, Instr, Location, TacOp};
use super::jumps::BreakLabels;

/// Emits pseudo-instructions for one program.
#[derive(Debug)]
pub struct Emitter {
    instrs: Vec<Instr>,
    target: TargetLayout,
    next_temp: u32,
    next_label: u32,
    /// Next free frame offset in the current function.
    frame_offset: i32,
    /// Bytes of locals and temporaries used by the current function.
    frame_used: i32,
    breaks: BreakLabels,
}

impl Emitter {
    pub fn new(target: TargetLayout) -> Self {
        Self {
            instrs: Vec::new(),
            target,
            next_temp: 0,
            next_label: 0,
            frame_offset: target.local_base,
            frame_used: 0,
            breaks: BreakLabels::new(),
        }
    }

    pub fn target(&self) -> &TargetLayout {
        &self.target
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn finish(self) -> Vec<Instr> {
        self.instrs
    }

    pub fn emit(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    /// A fresh, program-unique label.
    pub fn new_label(&mut self) -> String {
        let label = format!("_L{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// A fresh temporary in the current frame.
    pub fn temp(&mut self) -> Location {
        let name = format!("_tmp{}", self.next_temp);
        self.next_temp += 1;
        self.frame_slot(name)
    }

    /// A slot for a local variable in the current frame.
    pub fn local(&mut self, name: &str) -> Location {
        self.frame_slot(name.to_string())
    }

    fn frame_slot(&mut self, name: String) -> Location {
        let loc = Location::frame(self.frame_offset, name);
        self.frame_offset -= self.target.word_size;
        self.frame_used += self.target.word_size;
        loc
    }

    /// Start a new frame; locals and temporaries restart at the local base.
    pub fn begin_frame(&mut self) {
        self.frame_offset = self.target.local_base;
        self.frame_used = 0;
    }

    /// Bytes of frame used since [`begin_frame`](Self::begin_frame).
    pub fn frame_used(&self) -> i32 {
        self.frame_used
    }

    pub fn breaks(&mut self) -> &mut BreakLabels {
        &mut self.breaks
    }

    // ==========================================================================
    // Values
    // ==========================================================================

    pub fn load_constant(&mut self, value: i32) -> Location {
        let dst = self.temp();
        self.emit(Instr::LoadConstant {
            dst: dst.clone(),
            value,
        });
        dst
    }

    pub fn load_double(&mut self, value: OrderedFloat<f64>) -> Location {
        let dst = self.temp();
        self.emit(Instr::LoadDouble {
            dst: dst.clone(),
            value,
        });
        dst
    }

    pub fn load_string(&mut self, value: &str) -> Location {
        let dst = self.temp();
        self.emit(Instr::LoadString {
            dst: dst.clone(),
            value: value.to_string(),
        });
        dst
    }

    pub fn load_label(&mut self, label: &str) -> Location {
        let dst = self.temp();
        self.emit(Instr::LoadLabel {
            dst: dst.clone(),
            label: label.to_string(),
        });
        dst
    }

    pub fn assign(&mut self, dst: Location, src: Location) {
        self.emit(Instr::Assign { dst, src });
    }

    pub fn load(&mut self, base: Location, offset: i32) -> Location {
        let dst = self.temp();
        self.emit(Instr::Load {
            dst: dst.clone(),
            base,
            offset,
        });
        dst
    }

    pub fn store(&mut self, base: Location, offset: i32, src: Location) {
        self.emit(Instr::Store { base, offset, src });
    }

    pub fn binary(&mut self, op: TacOp, lhs: Location, rhs: Location) -> Location {
        let dst = self.temp();
        self.emit(Instr::Binary {
            op,
            dst: dst.clone(),
            lhs,
            rhs,
        });
        dst
    }

    // ==========================================================================
    // Control Flow
    // ==========================================================================

    pub fn label(&mut self, label: String) {
        self.emit(Instr::Label(label));
    }

    pub fn if_zero(&mut self, test: Location, label: String) {
        self.emit(Instr::IfZ { test, label });
    }

    pub fn goto(&mut self, label: String) {
        self.emit(Instr::Goto(label));
    }

    pub fn ret(&mut self, value: Option<Location>) {
        self.emit(Instr::Return(value));
    }

    pub fn begin_func(&mut self, frame_size: i32) {
        self.emit(Instr::BeginFunc { frame_size });
    }

    pub fn end_func(&mut self) {
        self.emit(Instr::EndFunc);
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    pub fn push_param(&mut self, loc: Location) {
        self.emit(Instr::PushParam(loc));
    }

    /// Pop `count` pushed words; nothing is emitted for zero.
    pub fn pop_params(&mut self, count: usize) {
        if count > 0 {
            let bytes = count as i32 * self.target.word_size;
            self.emit(Instr::PopParams(bytes));
        }
    }

    pub fn lcall(&mut self, label: &str, has_result: bool) -> Option<Location> {
        let dst = has_result.then(|| self.temp());
        self.emit(Instr::LCall {
            label: label.to_string(),
            dst: dst.clone(),
        });
        dst
    }

    pub fn acall(&mut self, addr: Location, has_result: bool) -> Option<Location> {
        let dst = has_result.then(|| self.temp());
        self.emit(Instr::ACall {
            addr,
            dst: dst.clone(),
        });
        dst
    }

    /// Call a builtin that produces no value.
    pub fn builtin(&mut self, builtin: Builtin, args: Vec<Location>) {
        debug_assert!(!builtin.has_result(), "{builtin:?} produces a value");
        debug_assert_eq!(args.len(), builtin.arity(), "{builtin:?} arity");
        self.emit(Instr::BuiltinCall {
            builtin,
            args,
            dst: None,
        });
    }

    /// Call a builtin that produces a value, returning where it is.
    pub fn builtin_value(&mut self, builtin: Builtin, args: Vec<Location>) -> Location {
        debug_assert!(builtin.has_result(), "{builtin:?} produces no value");
        debug_assert_eq!(args.len(), builtin.arity(), "{builtin:?} arity");
        let dst = self.temp();
        self.emit(Instr::BuiltinCall {
            builtin,
            args,
            dst: Some(dst.clone()),
        });
        dst
    }

    pub fn vtable(&mut self, class: &str, methods: Vec<String>) {
        self.emit(Instr::VTable {
            class: class.to_string(),
            methods,
        });
    }
}
