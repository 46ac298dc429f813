use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticType {
    Void,
    Int,
    Bool,
    Array(Box<SemanticType>, usize),
    Func(FuncType),
}

/// Signature of a function plus the frame layout computed for it.
#[derive(Debug, Clone, Eq)]
pub struct FuncType {
    pub params: Vec<SemanticType>,
    pub ret: Box<SemanticType>,
    pub param_size: usize,
    pub frame_size: usize,
}

// Layout sizes are not part of the type's identity.
impl PartialEq for FuncType {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.ret == other.ret
    }
}

impl FuncType {
    pub fn new(params: Vec<SemanticType>, ret: SemanticType) -> Self {
        FuncType {
            params,
            ret: Box::new(ret),
            param_size: 0,
            frame_size: 0,
        }
    }

    /// Frame offset of every parameter, in declaration order.
    pub fn param_offsets(&self) -> Vec<i64> {
        self.params
            .iter()
            .scan(0i64, |next, ty| {
                let offset = *next;
                *next = next.saturating_add(i64::try_from(ty.size()).unwrap_or(i64::MAX));
                Some(offset)
            })
            .collect()
    }
}

impl SemanticType {
    /// Storage units occupied by a value of this type.
    pub fn size(&self) -> usize {
        match self {
            SemanticType::Void => 0,
            SemanticType::Int | SemanticType::Bool => 1,
            SemanticType::Array(elem, count) => elem.size().saturating_mul(*count),
            SemanticType::Func(_) => 0,
        }
    }

    /// Size of this type, or `None` when it does not fit in a frame offset.
    pub fn checked_size(&self) -> Option<usize> {
        match self {
            SemanticType::Array(elem, count) => elem
                .checked_size()?
                .checked_mul(*count)
                .filter(|size| i64::try_from(*size).is_ok()),
            other => Some(other.size()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, SemanticType::Int | SemanticType::Bool)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SemanticType::Array(..))
    }

    /// Types a variable, parameter or argument may have.
    pub fn is_value(&self) -> bool {
        match self {
            SemanticType::Int | SemanticType::Bool => true,
            SemanticType::Array(elem, _) => elem.is_value(),
            SemanticType::Void | SemanticType::Func(_) => false,
        }
    }

    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            SemanticType::Func(func) => Some(func),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Void => write!(f, "void"),
            SemanticType::Int => write!(f, "int"),
            SemanticType::Bool => write!(f, "bool"),
            SemanticType::Array(elem, count) => write!(f, "[{}]{}", count, elem),
            SemanticType::Func(func) => write!(
                f,
                "func({}): {}",
                func.params.iter().map(|ty| ty.to_string()).join(", "),
                func.ret
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(elem: SemanticType, count: usize) -> SemanticType {
        SemanticType::Array(Box::new(elem), count)
    }

    #[test]
    fn sizes() {
        assert_eq!(SemanticType::Void.size(), 0);
        assert_eq!(SemanticType::Bool.size(), 1);
        assert_eq!(array(SemanticType::Int, 4).size(), 4);
        assert_eq!(array(array(SemanticType::Bool, 3), 2).size(), 6);
        assert_eq!(array(SemanticType::Int, 0).size(), 0);
    }

    #[test]
    fn oversized_arrays() {
        let huge = array(array(SemanticType::Int, 1 << 32), 1 << 32);
        assert_eq!(huge.checked_size(), None);
        assert_eq!(huge.size(), usize::MAX);
        assert_eq!(array(SemanticType::Int, usize::MAX).checked_size(), None);
        assert_eq!(array(SemanticType::Bool, 3).checked_size(), Some(3));
        assert_eq!(array(array(SemanticType::Int, 0), usize::MAX).checked_size(), Some(0));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(array(SemanticType::Int, 3), array(SemanticType::Int, 3));
        assert_ne!(array(SemanticType::Int, 3), array(SemanticType::Int, 4));
        assert_ne!(array(SemanticType::Int, 3), array(SemanticType::Bool, 3));

        let mut laid_out = FuncType::new(vec![SemanticType::Int], SemanticType::Bool);
        laid_out.param_size = 1;
        laid_out.frame_size = 5;
        let fresh = FuncType::new(vec![SemanticType::Int], SemanticType::Bool);
        assert_eq!(SemanticType::Func(laid_out), SemanticType::Func(fresh));
    }

    #[test]
    fn param_offsets_follow_sizes() {
        let func = FuncType::new(
            vec![SemanticType::Int, array(SemanticType::Int, 3), SemanticType::Bool],
            SemanticType::Void,
        );
        assert_eq!(func.param_offsets(), vec![0, 1, 4]);
    }

    #[test]
    fn display() {
        let func = FuncType::new(
            vec![SemanticType::Int, array(SemanticType::Bool, 2)],
            SemanticType::Int,
        );
        assert_eq!(SemanticType::Func(func).to_string(), "func(int, [2]bool): int");
    }
}
