//! Semantic diagnostics.
//!
//! Every problem the analyzer finds is one [`SemanticError`] handed to a
//! [`DiagnosticSink`]. Each error carries a [`Reason`] drawn from a closed set;
//! rendering a message for the user is the sink's business, the analyzer
//! only records structured facts (names, types, spans).
//!
//! ```text
//! ErrorCategory
//! ├── DeclarationConflict   - duplicate name within one scope
//! ├── UnresolvedIdentifier  - class/interface/type/variable/function not found
//! ├── TypeMismatch          - operand, assignment, argument, return, test
//! └── StructuralViolation   - break/this/return placement, arity, contracts
//! ```

use thiserror::Error;

use crate::{Span, Type};

/// What kind of declaration a failed lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookingFor {
    Class,
    Interface,
    Type,
    Variable,
    Function,
}

impl LookingFor {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookingFor::Class => "class",
            LookingFor::Interface => "interface",
            LookingFor::Type => "type",
            LookingFor::Variable => "variable",
            LookingFor::Function => "function",
        }
    }
}

/// The closed set of reason codes attached to diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    DeclarationConflict,
    LookingForClass,
    LookingForInterface,
    LookingForType,
    LookingForVariable,
    LookingForFunction,
    IncompatibleOperand,
    IncompatibleOperands,
    TestNotBoolean,
    ReturnMismatch,
    ArgumentMismatch,
    PrintArgumentMismatch,
    SubscriptNotInteger,
    NewArraySizeNotInteger,
    SwitchNotInteger,
    BreakOutsideLoop,
    ThisOutsideClass,
    ReturnOutsideFunction,
    ArgumentCountMismatch,
    InterfaceNotImplemented,
    OverrideMismatch,
    FieldNotFoundInBase,
    InaccessibleField,
    BracketsOnNonArray,
    InheritanceCycle,
    InterfaceDispatch,
}

/// Coarse grouping of reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    DeclarationConflict,
    UnresolvedIdentifier,
    TypeMismatch,
    StructuralViolation,
}

impl Reason {
    pub fn category(&self) -> ErrorCategory {
        use Reason::*;
        match self {
            DeclarationConflict => ErrorCategory::DeclarationConflict,
            LookingForClass | LookingForInterface | LookingForType | LookingForVariable
            | LookingForFunction => ErrorCategory::UnresolvedIdentifier,
            IncompatibleOperand | IncompatibleOperands | TestNotBoolean | ReturnMismatch
            | ArgumentMismatch | PrintArgumentMismatch => ErrorCategory::TypeMismatch,
            SubscriptNotInteger | NewArraySizeNotInteger | SwitchNotInteger | BreakOutsideLoop
            | ThisOutsideClass | ReturnOutsideFunction | ArgumentCountMismatch
            | InterfaceNotImplemented | OverrideMismatch | FieldNotFoundInBase
            | InaccessibleField | BracketsOnNonArray | InheritanceCycle | InterfaceDispatch => {
                ErrorCategory::StructuralViolation
            }
        }
    }
}

impl From<LookingFor> for Reason {
    fn from(value: LookingFor) -> Self {
        match value {
            LookingFor::Class => Reason::LookingForClass,
            LookingFor::Interface => Reason::LookingForInterface,
            LookingFor::Type => Reason::LookingForType,
            LookingFor::Variable => Reason::LookingForVariable,
            LookingFor::Function => Reason::LookingForFunction,
        }
    }
}

/// A problem found during semantic analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    /// A name was declared twice in one scope (or a field shadows an inherited field).
    #[error("at {span}: declaration of '{name}' conflicts with declaration at {previous}")]
    DeclConflict {
        name: String,
        span: Span,
        previous: Span,
    },

    /// A name did not resolve to a declaration of the expected kind.
    #[error("at {span}: no declaration found for {} '{name}'", .looking_for.as_str())]
    NotDeclared {
        name: String,
        looking_for: LookingFor,
        span: Span,
    },

    /// A unary operator was applied to an operand of the wrong type.
    #[error("at {span}: incompatible operand: {op} {operand}")]
    IncompatibleOperand {
        op: &'static str,
        operand: Type,
        span: Span,
    },

    /// A binary operator (or assignment) was applied to mismatched operands.
    #[error("at {span}: incompatible operands: {left} {op} {right}")]
    IncompatibleOperands {
        op: &'static str,
        left: Type,
        right: Type,
        span: Span,
    },

    /// An `if`/`while`/`for` test is not boolean.
    #[error("at {span}: test expression must have boolean type")]
    TestNotBoolean { span: Span },

    /// A returned value does not match the function's return type.
    #[error("at {span}: incompatible return: {given} given, {expected} expected")]
    ReturnMismatch {
        given: Type,
        expected: Type,
        span: Span,
    },

    /// An actual argument does not match its formal parameter.
    #[error("at {span}: incompatible argument {position}: {given} given, {expected} expected")]
    ArgumentMismatch {
        position: usize,
        given: Type,
        expected: Type,
        span: Span,
    },

    /// A `Print` argument is not int, bool or string.
    #[error("at {span}: incompatible argument {position}: {given} given, int/bool/string expected")]
    PrintArgumentMismatch {
        position: usize,
        given: Type,
        span: Span,
    },

    /// Array subscript is not exactly `int`.
    #[error("at {span}: array subscript must be an integer")]
    SubscriptNotInteger { span: Span },

    /// `NewArray` size is not exactly `int`.
    #[error("at {span}: size for NewArray must be an integer")]
    NewArraySizeNotInteger { span: Span },

    /// `switch` scrutinee is not `int`.
    #[error("at {span}: switch expression must be an integer, {given} given")]
    SwitchNotInteger { given: Type, span: Span },

    /// `break` outside of any loop or switch.
    #[error("at {span}: break is only allowed inside a loop")]
    BreakOutsideLoop { span: Span },

    /// `this` outside of any class.
    #[error("at {span}: 'this' is only valid within class scope")]
    ThisOutsideClass { span: Span },

    /// `return` outside of any function.
    #[error("at {span}: return is only allowed inside a function")]
    ReturnOutsideFunction { span: Span },

    /// Call with the wrong number of arguments.
    #[error("at {span}: function '{name}' expects {expected} arguments but {given} given")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        given: usize,
        span: Span,
    },

    /// A class does not provide every method of an interface it implements.
    #[error("at {span}: class '{class}' does not implement entire interface '{interface}'")]
    InterfaceNotImplemented {
        class: String,
        interface: String,
        span: Span,
    },

    /// A method redeclares an inherited or interface method with a different signature.
    #[error("at {span}: method '{name}' must match inherited type signature")]
    OverrideMismatch { name: String, span: Span },

    /// A member name was not found on the base expression's type.
    #[error("at {span}: {base} has no such field '{field}'")]
    FieldNotFoundInBase {
        field: String,
        base: Type,
        span: Span,
    },

    /// A field was accessed through an explicit base from outside any class.
    #[error("at {span}: {base} field '{field}' only accessible within class scope")]
    InaccessibleField {
        field: String,
        base: Type,
        span: Span,
    },

    /// Subscript applied to something that is not an array.
    #[error("at {span}: [] can only be applied to arrays")]
    BracketsOnNonArray { span: Span },

    /// A class reaches itself through its `extends` chain.
    #[error("at {span}: class '{class}' inherits from itself")]
    InheritanceCycle { class: String, span: Span },

    /// A method called through an interface-typed value; classes only carry
    /// class vtables, so there is no slot to dispatch through.
    #[error("at {span}: method '{method}' cannot be called through interface '{interface}'")]
    InterfaceDispatch {
        interface: String,
        method: String,
        span: Span,
    },
}

impl SemanticError {
    /// The reason code of this diagnostic.
    pub fn reason(&self) -> Reason {
        match self {
            SemanticError::DeclConflict { .. } => Reason::DeclarationConflict,
            SemanticError::NotDeclared { looking_for, .. } => (*looking_for).into(),
            SemanticError::IncompatibleOperand { .. } => Reason::IncompatibleOperand,
            SemanticError::IncompatibleOperands { .. } => Reason::IncompatibleOperands,
            SemanticError::TestNotBoolean { .. } => Reason::TestNotBoolean,
            SemanticError::ReturnMismatch { .. } => Reason::ReturnMismatch,
            SemanticError::ArgumentMismatch { .. } => Reason::ArgumentMismatch,
            SemanticError::PrintArgumentMismatch { .. } => Reason::PrintArgumentMismatch,
            SemanticError::SubscriptNotInteger { .. } => Reason::SubscriptNotInteger,
            SemanticError::NewArraySizeNotInteger { .. } => Reason::NewArraySizeNotInteger,
            SemanticError::SwitchNotInteger { .. } => Reason::SwitchNotInteger,
            SemanticError::BreakOutsideLoop { .. } => Reason::BreakOutsideLoop,
            SemanticError::ThisOutsideClass { .. } => Reason::ThisOutsideClass,
            SemanticError::ReturnOutsideFunction { .. } => Reason::ReturnOutsideFunction,
            SemanticError::ArgumentCountMismatch { .. } => Reason::ArgumentCountMismatch,
            SemanticError::InterfaceNotImplemented { .. } => Reason::InterfaceNotImplemented,
            SemanticError::OverrideMismatch { .. } => Reason::OverrideMismatch,
            SemanticError::FieldNotFoundInBase { .. } => Reason::FieldNotFoundInBase,
            SemanticError::InaccessibleField { .. } => Reason::InaccessibleField,
            SemanticError::BracketsOnNonArray { .. } => Reason::BracketsOnNonArray,
            SemanticError::InheritanceCycle { .. } => Reason::InheritanceCycle,
            SemanticError::InterfaceDispatch { .. } => Reason::InterfaceDispatch,
        }
    }

    /// Where the problem was found.
    pub fn span(&self) -> Span {
        match self {
            SemanticError::DeclConflict { span, .. }
            | SemanticError::NotDeclared { span, .. }
            | SemanticError::IncompatibleOperand { span, .. }
            | SemanticError::IncompatibleOperands { span, .. }
            | SemanticError::TestNotBoolean { span }
            | SemanticError::ReturnMismatch { span, .. }
            | SemanticError::ArgumentMismatch { span, .. }
            | SemanticError::PrintArgumentMismatch { span, .. }
            | SemanticError::SubscriptNotInteger { span }
            | SemanticError::NewArraySizeNotInteger { span }
            | SemanticError::SwitchNotInteger { span, .. }
            | SemanticError::BreakOutsideLoop { span }
            | SemanticError::ThisOutsideClass { span }
            | SemanticError::ReturnOutsideFunction { span }
            | SemanticError::ArgumentCountMismatch { span, .. }
            | SemanticError::InterfaceNotImplemented { span, .. }
            | SemanticError::OverrideMismatch { span, .. }
            | SemanticError::FieldNotFoundInBase { span, .. }
            | SemanticError::InaccessibleField { span, .. }
            | SemanticError::InheritanceCycle { span, .. }
            | SemanticError::InterfaceDispatch { span, .. }
            | SemanticError::BracketsOnNonArray { span } => *span,
        }
    }
}

/// Receives diagnostics, one call per problem.
pub trait DiagnosticSink {
    fn report(&mut self, error: SemanticError);

    /// Number of diagnostics received so far.
    fn count(&self) -> usize;
}

/// Accumulating sink that keeps every diagnostic in report order.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticError> {
        self.errors.iter()
    }

    /// Reason codes in report order.
    pub fn reasons(&self) -> Vec<Reason> {
        self.errors.iter().map(SemanticError::reason).collect()
    }

    /// How many diagnostics carry `reason`.
    pub fn count_of(&self, reason: Reason) -> usize {
        self.errors.iter().filter(|e| e.reason() == reason).count()
    }

    pub fn into_vec(self) -> Vec<SemanticError> {
        self.errors
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    fn count(&self) -> usize {
        self.errors.len()
    }
}
