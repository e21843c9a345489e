//! Cross-declaration checks and type resolution.
//!
//! Runs after every line has been parsed on its own, and decides which
//! declarations survive into the generated output:
//!
//! - names must be unique, and must not clash with a registry entry
//!   of a different class;
//! - every field and variant type must resolve to `Token`, a surviving
//!   declaration, or a registry name;
//! - every enum must map each node kind and token tag it can be cast from
//!   to exactly one variant, and must not contain itself.
//!
//! Rejecting a declaration can invalidate declarations which refer to it,
//! so resolution is repeated until a round rejects nothing.

use hashbrown::{HashMap, HashSet};
use rustc_hash::FxBuildHasher;

use crate::{
    error::{Error, ErrorKind, Report},
    parser::{Cardinality, Decl, DeclKind, Field, Optionality, RAW_TOKEN, Variant},
    reader::Line,
    registry::{Registry, RegistryClass},
};

/// How a field's child is read from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Always a node child.
    Node,
    /// Always a token child.
    Token,
    /// Either, decided by the child's runtime discriminant.
    Polymorphic,
    /// A token child returned as-is.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub name: &'a str,
    pub line: Line<'a>,
    pub kind: ResolvedKind<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKind<'a> {
    TokenLeaf { tag: &'a str, nullable: bool },
    Struct(Vec<ResolvedField<'a>>),
    Enum(Vec<ResolvedVariant<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField<'a> {
    pub name: &'a str,
    pub ty: &'a str,
    pub shape: Shape,
    pub cardinality: Cardinality,
    pub optionality: Optionality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant<'a> {
    pub name: &'a str,
    pub ty: &'a str,
    /// Node kinds dispatched to this variant.
    pub kinds: Vec<&'a str>,
    /// Token tags dispatched to this variant.
    pub tags: Vec<&'a str>,
}

impl ResolvedVariant<'_> {
    #[inline]
    pub fn has_node(&self) -> bool {
        !self.kinds.is_empty()
    }

    #[inline]
    pub fn has_token(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Returns the surviving declarations in source order.
///
/// Every rejected declaration leaves at least one error in `report`.
pub fn resolve<'a>(
    decls: Vec<Decl<'a>>,
    registry: &'a Registry,
    report: &mut Report,
) -> Vec<Resolved<'a>> {
    let mut schema = Schema::new(decls, registry);
    schema.reject_duplicates(report);
    schema.reject_registry_conflicts(report);
    schema.resolve(report)
}

struct Schema<'a> {
    registry: &'a Registry,
    decls: Vec<Decl<'a>>,
    alive: Vec<bool>,
    by_name: HashMap<&'a str, usize, FxBuildHasher>,
    rejected: HashSet<&'a str, FxBuildHasher>,
}

enum Target {
    Raw,
    Declared(usize),
    TokenLeaf,
    Polymorphic,
}

enum Fail {
    /// The declaration being checked is invalid.
    Error(Error),
    /// An enum reached while checking the current one contains the root
    /// of the traversal.
    Cycle,
    /// Something the declaration depends on is invalid, and will be
    /// rejected by its own check.
    Deferred,
}

#[derive(Default)]
struct Keys<'a> {
    kinds: Vec<&'a str>,
    tags: Vec<&'a str>,
}

impl<'a> Keys<'a> {
    fn kind(kind: &'a str) -> Self {
        Self {
            kinds: vec![kind],
            tags: vec![],
        }
    }

    fn tag(tag: &'a str) -> Self {
        Self {
            kinds: vec![],
            tags: vec![tag],
        }
    }

    fn merge(payload: Vec<Keys<'a>>) -> Self {
        let mut out = Keys::default();
        for keys in payload {
            out.kinds.extend(keys.kinds);
            out.tags.extend(keys.tags);
        }
        out
    }

    /// First discriminant present in both.
    fn overlap(&self, other: &Keys<'a>) -> Option<String> {
        if let Some(kind) = self.kinds.iter().find(|k| other.kinds.contains(*k)) {
            return Some(format!("NodeKind::{kind}"));
        }
        if let Some(tag) = self.tags.iter().find(|t| other.tags.contains(*t)) {
            return Some(format!("Tag::{tag}"));
        }
        None
    }
}

impl<'a> Schema<'a> {
    fn new(decls: Vec<Decl<'a>>, registry: &'a Registry) -> Self {
        Self {
            registry,
            alive: vec![true; decls.len()],
            by_name: HashMap::with_capacity_and_hasher(decls.len(), FxBuildHasher),
            rejected: HashSet::with_hasher(FxBuildHasher),
            decls,
        }
    }

    fn reject(&mut self, index: usize) {
        let decl = &self.decls[index];
        log::debug!(
            "suppressing {} `{}` on line {}",
            decl.kind.describe(),
            decl.name,
            decl.line.number
        );
        self.rejected.insert(decl.name);
        self.alive[index] = false;
    }

    fn reject_duplicates(&mut self, report: &mut Report) {
        let mut occurrences: HashMap<&'a str, Vec<usize>, FxBuildHasher> =
            HashMap::with_hasher(FxBuildHasher);
        for (i, decl) in self.decls.iter().enumerate() {
            occurrences.entry(decl.name).or_default().push(i);
        }

        for i in 0..self.decls.len() {
            let decl = &self.decls[i];
            let same = &occurrences[&decl.name];
            if same.len() == 1 {
                self.by_name.insert(decl.name, i);
                continue;
            }

            let other_lines = same
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| self.decls[j].line.number)
                .collect();
            let kind = ErrorKind::Duplicate {
                name: decl.name.into(),
                other_lines,
            };
            report.push(decl.line.error(kind, decl.span));
            self.reject(i);
        }
    }

    fn reject_registry_conflicts(&mut self, report: &mut Report) {
        for i in 0..self.decls.len() {
            if !self.alive[i] {
                continue;
            }

            let decl = &self.decls[i];
            let class = match (&decl.kind, self.registry.class_of(decl.name)) {
                (_, None) => continue,
                (DeclKind::TokenLeaf, Some(RegistryClass::TokenLeaf)) => continue,
                (DeclKind::Enum(_), Some(RegistryClass::Polymorphic)) => continue,
                (_, Some(class)) => class,
            };

            let kind = ErrorKind::RegistryConflict {
                name: decl.name.into(),
                class: class.describe(),
            };
            report.push(decl.line.error(kind, decl.span));
            self.reject(i);
        }
    }

    fn resolve(mut self, report: &mut Report) -> Vec<Resolved<'a>> {
        let mut round = 0;
        loop {
            round += 1;

            let mut resolved = Vec::with_capacity(self.decls.len());
            let mut deferred = 0;
            let mut rejected = false;
            for i in 0..self.decls.len() {
                if !self.alive[i] {
                    continue;
                }

                match self.check(i) {
                    Ok(kind) => resolved.push(Resolved {
                        name: self.decls[i].name,
                        line: self.decls[i].line,
                        kind,
                    }),
                    Err(Fail::Error(error)) => {
                        report.push(error);
                        self.reject(i);
                        rejected = true;
                    }
                    Err(Fail::Cycle | Fail::Deferred) => deferred += 1,
                }
            }

            if !rejected {
                log::debug!(
                    "resolved {} declarations in {round} rounds ({deferred} left unresolved)",
                    resolved.len()
                );
                return resolved;
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Target, ErrorKind> {
        if name == RAW_TOKEN {
            return Ok(Target::Raw);
        }

        match self.by_name.get(name) {
            Some(&i) if self.alive[i] => return Ok(Target::Declared(i)),
            // a registry entry for a rejected enum describes that enum
            Some(&i) if matches!(self.decls[i].kind, DeclKind::Enum(_)) => {
                return Err(ErrorKind::UnknownType {
                    name: name.into(),
                    rejected: true,
                });
            }
            _ => {}
        }

        match self.registry.class_of(name) {
            Some(RegistryClass::TokenLeaf) => Ok(Target::TokenLeaf),
            Some(RegistryClass::Polymorphic) => Ok(Target::Polymorphic),
            None => Err(ErrorKind::UnknownType {
                name: name.into(),
                rejected: self.rejected.contains(name),
            }),
        }
    }

    fn check(&self, index: usize) -> Result<ResolvedKind<'a>, Fail> {
        let decl = &self.decls[index];
        match &decl.kind {
            DeclKind::TokenLeaf => Ok(ResolvedKind::TokenLeaf {
                tag: self.registry.tag_for(decl.name),
                nullable: self.registry.is_nullable(decl.name),
            }),
            DeclKind::Struct(fields) => fields
                .iter()
                .map(|field| self.check_field(decl, field))
                .collect::<Result<_, _>>()
                .map(ResolvedKind::Struct),
            DeclKind::Enum(variants) => {
                let payload = self.payload(index, &mut Vec::new())?;
                if self.registry.is_polymorphic(decl.name) {
                    self.check_mixed(decl, &payload)?;
                }
                let variants = variants
                    .iter()
                    .zip(payload)
                    .map(|(variant, keys)| ResolvedVariant {
                        name: variant.name,
                        ty: variant.ty,
                        kinds: keys.kinds,
                        tags: keys.tags,
                    })
                    .collect();
                Ok(ResolvedKind::Enum(variants))
            }
        }
    }

    fn check_field(&self, decl: &Decl<'a>, field: &Field<'a>) -> Result<ResolvedField<'a>, Fail> {
        let ty = field.ty;
        let shape = match self.lookup(ty.inner) {
            Err(kind) => return Err(Fail::Error(decl.line.error(kind, ty.span))),
            Ok(Target::Raw) => Shape::Raw,
            Ok(Target::TokenLeaf) => Shape::Token,
            Ok(Target::Polymorphic) => Shape::Polymorphic,
            Ok(Target::Declared(j)) => match &self.decls[j].kind {
                DeclKind::TokenLeaf => Shape::Token,
                DeclKind::Struct(_) => Shape::Node,
                DeclKind::Enum(_) => self.enum_shape(j)?,
            },
        };

        Ok(ResolvedField {
            name: field.name,
            ty: ty.inner,
            shape,
            cardinality: ty.cardinality,
            optionality: ty.optionality,
        })
    }

    /// An enum listed as polymorphic must hold both nodes and tokens.
    fn check_mixed(&self, decl: &Decl<'a>, payload: &[Keys<'a>]) -> Result<(), Fail> {
        let node = payload.iter().any(|keys| !keys.kinds.is_empty());
        let token = payload.iter().any(|keys| !keys.tags.is_empty());
        let holds = match (node, token) {
            (true, true) => return Ok(()),
            (true, false) => "nodes",
            _ => "tokens",
        };
        Err(Fail::Error(decl.line.error(
            ErrorKind::NotPolymorphic {
                name: decl.name.into(),
                holds,
            },
            decl.span,
        )))
    }

    fn enum_shape(&self, index: usize) -> Result<Shape, Fail> {
        let payload = self
            .payload(index, &mut Vec::new())
            .map_err(|_| Fail::Deferred)?;
        let node = payload.iter().any(|keys| !keys.kinds.is_empty());
        let token = payload.iter().any(|keys| !keys.tags.is_empty());
        Ok(match (node, token) {
            (true, true) => Shape::Polymorphic,
            (false, true) => Shape::Token,
            _ => Shape::Node,
        })
    }

    /// Dispatch keys of each variant of the enum at `index`.
    ///
    /// `stack` holds the enums currently being expanded, with the root
    /// of the traversal at the bottom.
    fn payload(&self, index: usize, stack: &mut Vec<usize>) -> Result<Vec<Keys<'a>>, Fail> {
        let decl = &self.decls[index];
        let DeclKind::Enum(variants) = &decl.kind else {
            return Ok(Vec::new());
        };

        stack.push(index);
        let result = self.variant_keys(decl, variants, stack);
        stack.pop();
        result
    }

    fn variant_keys(
        &self,
        decl: &Decl<'a>,
        variants: &[Variant<'a>],
        stack: &mut Vec<usize>,
    ) -> Result<Vec<Keys<'a>>, Fail> {
        let at_root = stack.len() == 1;
        let root = stack[0];

        let mut payload: Vec<Keys<'a>> = Vec::with_capacity(variants.len());
        for variant in variants {
            let error = |kind: ErrorKind| Fail::Error(decl.line.error(kind, variant.span));
            let cycle = || {
                if at_root {
                    error(ErrorKind::Cycle {
                        name: decl.name.into(),
                    })
                } else {
                    Fail::Cycle
                }
            };

            let keys = match self.lookup(variant.ty).map_err(error)? {
                Target::Raw => {
                    return Err(error(ErrorKind::Malformed(
                        format!("variant `{}` cannot wrap a raw `{RAW_TOKEN}`", variant.name)
                            .into(),
                    )));
                }
                Target::Polymorphic => {
                    return Err(error(ErrorKind::OpaqueVariant {
                        name: variant.ty.into(),
                    }));
                }
                Target::TokenLeaf => Keys::tag(self.registry.tag_for(variant.ty)),
                Target::Declared(j) => match &self.decls[j].kind {
                    DeclKind::TokenLeaf => Keys::tag(self.registry.tag_for(variant.ty)),
                    DeclKind::Struct(_) => Keys::kind(variant.ty),
                    DeclKind::Enum(_) if j == root => return Err(cycle()),
                    DeclKind::Enum(_) if stack.contains(&j) => return Err(Fail::Deferred),
                    DeclKind::Enum(_) => match self.payload(j, stack) {
                        Ok(nested) => Keys::merge(nested),
                        Err(Fail::Cycle) => return Err(cycle()),
                        Err(_) => return Err(Fail::Deferred),
                    },
                },
            };

            let previous = payload
                .iter()
                .zip(variants)
                .find_map(|(other, v)| Some((keys.overlap(other)?, v.name)));
            if let Some((discriminant, first)) = previous {
                return Err(error(ErrorKind::AmbiguousDispatch {
                    discriminant,
                    first: first.into(),
                    second: variant.name.into(),
                }));
            }

            payload.push(keys);
        }

        Ok(payload)
    }
}
