//! Path-addressed tree assembly
//!
//! Entrypoint arguments and storage values are right combs of binary pairs.
//! This module folds flat argument lists into that shape and assembles trees
//! from values placed at explicit structural coordinates, which is how calls
//! are built from sparse or named argument sets that do not follow declared
//! field order.

use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};
use crate::types::TypeDescriptor;
use std::collections::BTreeMap;

/// One step of a structural path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    /// Left child of a pair (`l` or `0`)
    Left,
    /// Right child of a pair (`r` or `1`)
    Right,
}

/// Parse a textual path such as `r/r/l` or `1/1/0`
///
/// The empty string addresses the root.
pub fn parse_path(path: &str) -> Result<Vec<Branch>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('/')
        .map(|segment| match segment {
            "l" | "L" | "0" => Ok(Branch::Left),
            "r" | "R" | "1" => Ok(Branch::Right),
            _ => Err(BindError::InvalidPath(path.to_string())),
        })
        .collect()
}

/// Render a path in the `l`/`r` notation
pub fn render_path(path: &[Branch]) -> String {
    path.iter()
        .map(|step| match step {
            Branch::Left => "l",
            Branch::Right => "r",
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of the `index`-th element of a right comb with `count` leaves
///
/// Element N sits below N right steps followed by one left step, except the
/// last element which is reached through right steps only.
pub fn comb_path(index: usize, count: usize) -> Vec<Branch> {
    let mut path = vec![Branch::Right; index];
    if index + 1 < count {
        path.push(Branch::Left);
    }
    path
}

/// Fold a flat list of values into a right comb of binary pairs
///
/// No values yield `Unit`, a single value is returned as is, and for N values
/// the last two are paired first, then each earlier value is paired with the
/// result.
pub fn fold_right_comb(values: Vec<Prim>) -> Prim {
    let mut iter = values.into_iter().rev();
    let Some(mut acc) = iter.next() else {
        return Prim::unit();
    };
    for value in iter {
        acc = Prim::pair(value, acc);
    }
    acc
}

/// A value tree under construction
///
/// Unlike [`Prim`] it can contain holes: positions that are structurally
/// known but not yet assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PathTree {
    /// Position not assigned yet
    #[default]
    Hole,
    /// Assigned value
    Leaf(Prim),
    /// Binary pair of subtrees
    Pair(Box<PathTree>, Box<PathTree>),
}

impl PathTree {
    /// Empty tree
    pub fn new() -> Self {
        Self::Hole
    }

    /// Place `value` at `path`, creating pair nodes along the way
    ///
    /// Existing pair leaves are opened up on demand; any other leaf found
    /// mid-path is a [`BindError::PathConflict`]. The position at the end of
    /// the path is overwritten.
    pub fn insert_at_path(&mut self, path: &[Branch], value: Prim) -> Result<()> {
        let mut node = self;
        for (depth, step) in path.iter().enumerate() {
            node.open_pair(&path[..depth])?;
            node = match node {
                Self::Pair(left, right) => match step {
                    Branch::Left => left.as_mut(),
                    Branch::Right => right.as_mut(),
                },
                _ => {
                    return Err(BindError::PathConflict {
                        path: render_path(&path[..depth]),
                    })
                }
            };
        }
        *node = Self::Leaf(value);
        Ok(())
    }

    /// Turn this position into a pair node if it is a hole or a pair leaf
    fn open_pair(&mut self, at: &[Branch]) -> Result<()> {
        match self {
            Self::Pair(..) => Ok(()),
            Self::Hole => {
                *self = Self::Pair(Box::default(), Box::default());
                Ok(())
            }
            Self::Leaf(prim) if prim.is_pair() && prim.args().len() >= 2 => {
                *self = Self::from(prim.clone());
                Ok(())
            }
            Self::Leaf(_) => Err(BindError::PathConflict {
                path: render_path(at),
            }),
        }
    }

    /// Convert into a value tree, failing on the first unassigned position
    pub fn into_prim(self) -> Result<Prim> {
        self.into_prim_at(&mut Vec::new())
    }

    fn into_prim_at(self, at: &mut Vec<Branch>) -> Result<Prim> {
        match self {
            Self::Hole => Err(BindError::IncompletePath {
                path: render_path(at),
            }),
            Self::Leaf(prim) => Ok(prim),
            Self::Pair(left, right) => {
                at.push(Branch::Left);
                let left = left.into_prim_at(at)?;
                at.pop();
                at.push(Branch::Right);
                let right = right.into_prim_at(at)?;
                at.pop();
                Ok(Prim::pair(left, right))
            }
        }
    }

    /// Assemble a parameter tree from arguments named after `%field`
    /// annotations of `typ`
    ///
    /// Every annotated field must receive a value; names that do not occur in
    /// the type are rejected.
    pub fn from_named(typ: &TypeDescriptor, args: &BTreeMap<String, Prim>) -> Result<Self> {
        let paths = typ.field_paths();
        let mut tree = Self::new();
        for (name, value) in args {
            let path = paths
                .get(name)
                .ok_or_else(|| BindError::UnknownField(name.clone()))?;
            tree.insert_at_path(path, value.clone())?;
        }
        for (name, path) in &paths {
            if !args.contains_key(name) {
                return Err(BindError::IncompletePath {
                    path: format!("{} (%{})", render_path(path), name),
                });
            }
        }
        Ok(tree)
    }
}

impl From<Prim> for PathTree {
    fn from(prim: Prim) -> Self {
        match prim.unfold_comb() {
            Prim::App {
                op: OpCode::Pair,
                mut args,
                ..
            } if args.len() == 2 => {
                let right = args.pop().unwrap_or_else(Prim::unit);
                let left = args.pop().unwrap_or_else(Prim::unit);
                Self::Pair(Box::new(Self::from(left)), Box::new(Self::from(right)))
            }
            other => Self::Leaf(other),
        }
    }
}

/// Place `value` at `path` inside an existing tree
pub fn insert_at_path(tree: Prim, value: Prim, path: &[Branch]) -> Result<Prim> {
    let mut builder = PathTree::from(tree);
    builder.insert_at_path(path, value)?;
    builder.into_prim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_notations() {
        assert_eq!(
            parse_path("r/r/l").unwrap(),
            vec![Branch::Right, Branch::Right, Branch::Left]
        );
        assert_eq!(parse_path("1/0").unwrap(), vec![Branch::Right, Branch::Left]);
        assert!(parse_path("").unwrap().is_empty());
        assert_eq!(
            parse_path("r/x"),
            Err(BindError::InvalidPath("r/x".to_string()))
        );
    }

    #[test]
    fn test_comb_paths() {
        assert_eq!(render_path(&comb_path(0, 3)), "l");
        assert_eq!(render_path(&comb_path(1, 3)), "r/l");
        assert_eq!(render_path(&comb_path(2, 3)), "r/r");
        assert_eq!(render_path(&comb_path(0, 1)), "");
    }

    #[test]
    fn test_fold_right_comb() {
        assert_eq!(fold_right_comb(vec![]), Prim::unit());
        assert_eq!(fold_right_comb(vec![Prim::int(7)]), Prim::int(7));
        assert_eq!(
            fold_right_comb(vec![Prim::int(1), Prim::int(2), Prim::int(3)]),
            Prim::pair(Prim::int(1), Prim::pair(Prim::int(2), Prim::int(3)))
        );
    }

    #[test]
    fn test_fold_matches_comb_paths() {
        let values: Vec<Prim> = (0..5).map(Prim::int).collect();
        let tree = fold_right_comb(values.clone());
        for (i, value) in values.iter().enumerate() {
            assert_eq!(tree.get_path(&comb_path(i, values.len())).unwrap(), value);
        }
    }

    #[test]
    fn test_insert_out_of_order() {
        let mut tree = PathTree::new();
        tree.insert_at_path(&parse_path("r/r").unwrap(), Prim::int(3))
            .unwrap();
        tree.insert_at_path(&parse_path("l").unwrap(), Prim::int(1))
            .unwrap();
        assert_eq!(
            tree.clone().into_prim(),
            Err(BindError::IncompletePath {
                path: "r/l".to_string()
            })
        );
        tree.insert_at_path(&parse_path("r/l").unwrap(), Prim::int(2))
            .unwrap();
        assert_eq!(
            tree.into_prim().unwrap(),
            fold_right_comb(vec![Prim::int(1), Prim::int(2), Prim::int(3)])
        );
    }

    #[test]
    fn test_insert_conflict_on_leaf() {
        let mut tree = PathTree::new();
        tree.insert_at_path(&[Branch::Left], Prim::int(1)).unwrap();
        assert_eq!(
            tree.insert_at_path(&[Branch::Left, Branch::Right], Prim::int(2)),
            Err(BindError::PathConflict {
                path: "l".to_string()
            })
        );
    }

    #[test]
    fn test_patch_existing_tree() {
        let tree = fold_right_comb(vec![Prim::int(1), Prim::int(2), Prim::int(3)]);
        let patched = insert_at_path(tree, Prim::string("x"), &[Branch::Right, Branch::Left])
            .unwrap();
        assert_eq!(
            patched,
            fold_right_comb(vec![Prim::int(1), Prim::string("x"), Prim::int(3)])
        );
    }

    #[test]
    fn test_patch_inside_wide_pair() {
        let wide = Prim::app(
            OpCode::Pair,
            vec![Prim::int(1), Prim::int(2), Prim::int(3)],
        );
        let patched = insert_at_path(wide, Prim::int(9), &[Branch::Right, Branch::Right]).unwrap();
        assert_eq!(
            patched,
            fold_right_comb(vec![Prim::int(1), Prim::int(2), Prim::int(9)])
        );
    }
}
