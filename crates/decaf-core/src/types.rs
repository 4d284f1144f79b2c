//! The type system.
//!
//! Types are values compared structurally. There are three shapes:
//!
//! ```text
//! Primitive   int | double | bool | string | void | null | error
//! Named       a class or interface, referenced by name
//! Array       element type
//! ```
//!
//! The `error` primitive is a cascade absorber: any comparison with it is
//! satisfied, so one bad sub-expression produces one diagnostic instead of a
//! chain of follow-ups.

use std::fmt::{self, Display, Formatter};

/// Built-in primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Double,
    Bool,
    String,
    Void,
    /// Type of the `null` literal.
    Null,
    /// Type given to expressions that already failed checking.
    Error,
}

impl Primitive {
    /// Source-level spelling of the primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Double => "double",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Void => "void",
            Primitive::Null => "null",
            Primitive::Error => "error",
        }
    }
}

/// A type of a declaration or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    /// A class or interface, by declared name.
    Named(String),
    /// A single-dimension array of the element type.
    Array(Box<Type>),
}

/// Answers subtyping questions for named types.
///
/// The type system itself has no knowledge of declarations; the semantic
/// analyzer implements this over its scope tables.
pub trait ClassHierarchy {
    /// Whether values of class `class` may be used where `target` is expected,
    /// either because `target` is an ancestor class or an implemented interface.
    fn conforms_to(&self, class: &str, target: &str) -> bool;
}

impl Type {
    pub const INT: Type = Type::Primitive(Primitive::Int);
    pub const DOUBLE: Type = Type::Primitive(Primitive::Double);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);
    pub const STRING: Type = Type::Primitive(Primitive::String);
    pub const VOID: Type = Type::Primitive(Primitive::Void);
    pub const NULL: Type = Type::Primitive(Primitive::Null);
    pub const ERROR: Type = Type::Primitive(Primitive::Error);

    /// A class or interface type.
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// An array of `element`.
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Whether this is the cascade-absorbing `error` type.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Error))
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// `int` or `double`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Primitive(Primitive::Int) | Type::Primitive(Primitive::Double)
        )
    }

    /// The class or interface name, if this is a named type.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Type::Named(name) => Some(name),
            _ => None,
        }
    }

    /// The element type, if this is an array.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// The innermost non-array type (`Foo[][]` yields `Foo`).
    pub fn innermost(&self) -> &Type {
        let mut ty = self;
        while let Type::Array(elem) = ty {
            ty = elem;
        }
        ty
    }

    /// Structural equivalence.
    ///
    /// Primitives match by kind, named types by name, arrays by element
    /// equivalence. `error` on either side is always equivalent.
    pub fn is_equivalent_to(&self, other: &Type) -> bool {
        if self.is_error() || other.is_error() {
            return true;
        }
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Named(a), Type::Named(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a.is_equivalent_to(b),
            _ => false,
        }
    }

    /// Exact identity, used where equivalence is too loose (array subscripts,
    /// array sizes). `error` on either side still matches.
    pub fn is_equal_to(&self, other: &Type) -> bool {
        self.is_error() || other.is_error() || self == other
    }

    /// Whether a value of this type may be stored into a slot of type `target`.
    ///
    /// Accepts equivalent types, `null` into any named type, and a class into
    /// any ancestor class or implemented interface.
    pub fn is_assignable_to(&self, target: &Type, hierarchy: &dyn ClassHierarchy) -> bool {
        if self.is_equivalent_to(target) {
            return true;
        }
        match (self, target) {
            (Type::Primitive(Primitive::Null), Type::Named(_)) => true,
            (Type::Named(from), Type::Named(to)) => hierarchy.conforms_to(from, to),
            _ => false,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.as_str()),
            Type::Named(name) => f.write_str(name),
            Type::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMITIVES: [Primitive; 7] = [
        Primitive::Int,
        Primitive::Double,
        Primitive::Bool,
        Primitive::String,
        Primitive::Void,
        Primitive::Null,
        Primitive::Error,
    ];

    struct Flat;

    impl ClassHierarchy for Flat {
        fn conforms_to(&self, _class: &str, _target: &str) -> bool {
            false
        }
    }

    struct AnimalTree;

    impl ClassHierarchy for AnimalTree {
        fn conforms_to(&self, class: &str, target: &str) -> bool {
            matches!((class, target), ("Dog", "Animal") | ("Dog", "Pet"))
        }
    }

    #[test]
    fn primitive_equivalence_is_reflexive_and_symmetric() {
        for a in PRIMITIVES {
            let ta = Type::Primitive(a);
            assert!(ta.is_equivalent_to(&ta), "{ta} not reflexive");
            for b in PRIMITIVES {
                let tb = Type::Primitive(b);
                assert_eq!(
                    ta.is_equivalent_to(&tb),
                    tb.is_equivalent_to(&ta),
                    "{ta} / {tb} not symmetric"
                );
            }
        }
    }

    #[test]
    fn distinct_primitives_are_not_equivalent() {
        assert!(!Type::INT.is_equivalent_to(&Type::DOUBLE));
        assert!(!Type::BOOL.is_equivalent_to(&Type::STRING));
        assert!(!Type::NULL.is_equivalent_to(&Type::VOID));
    }

    #[test]
    fn error_absorbs_everything() {
        assert!(Type::ERROR.is_equivalent_to(&Type::named("Foo")));
        assert!(Type::array(Type::INT).is_equivalent_to(&Type::ERROR));
        assert!(Type::ERROR.is_equal_to(&Type::INT));
    }

    #[test]
    fn named_types_match_by_name() {
        assert!(Type::named("A").is_equivalent_to(&Type::named("A")));
        assert!(!Type::named("A").is_equivalent_to(&Type::named("B")));
        assert!(!Type::named("int").is_equivalent_to(&Type::INT));
    }

    #[test]
    fn arrays_compare_elements() {
        let ints = Type::array(Type::INT);
        assert!(ints.is_equivalent_to(&Type::array(Type::INT)));
        assert!(!ints.is_equivalent_to(&Type::array(Type::DOUBLE)));
        assert!(!ints.is_equivalent_to(&Type::INT));
        assert!(
            Type::array(Type::array(Type::named("A")))
                .is_equivalent_to(&Type::array(Type::array(Type::named("A"))))
        );
    }

    #[test]
    fn equality_is_stricter_than_equivalence_for_nested_error() {
        let ints = Type::array(Type::INT);
        let broken = Type::array(Type::ERROR);
        assert!(ints.is_equivalent_to(&broken));
        assert!(!ints.is_equal_to(&broken));
    }

    #[test]
    fn assignability() {
        assert!(Type::INT.is_assignable_to(&Type::INT, &Flat));
        assert!(!Type::DOUBLE.is_assignable_to(&Type::INT, &Flat));
        assert!(Type::NULL.is_assignable_to(&Type::named("Foo"), &Flat));
        assert!(!Type::NULL.is_assignable_to(&Type::INT, &Flat));
        assert!(Type::named("Dog").is_assignable_to(&Type::named("Animal"), &AnimalTree));
        assert!(Type::named("Dog").is_assignable_to(&Type::named("Pet"), &AnimalTree));
        assert!(!Type::named("Animal").is_assignable_to(&Type::named("Dog"), &AnimalTree));
    }

    #[test]
    fn display() {
        assert_eq!(Type::INT.to_string(), "int");
        assert_eq!(Type::array(Type::named("Cell")).to_string(), "Cell[]");
        assert_eq!(Type::array(Type::array(Type::BOOL)).to_string(), "bool[][]");
    }

    #[test]
    fn innermost_and_element() {
        let grid = Type::array(Type::array(Type::named("Cell")));
        assert_eq!(grid.innermost(), &Type::named("Cell"));
        assert_eq!(grid.element_type(), Some(&Type::array(Type::named("Cell"))));
        assert_eq!(Type::INT.element_type(), None);
    }
}
