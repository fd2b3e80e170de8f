//! The fixed, ordered set of builders rosdoc dispatches to.

use crate::doxygen::DoxygenBuilder;
use crate::epydoc::EpydocBuilder;
use crate::sphinx::SphinxBuilder;
use crate::traits::{Builder, BuilderKind};

/// An ordered list of builders. Dispatch always follows this order.
pub struct BuilderRegistry {
    builders: Vec<Box<dyn Builder>>,
}

impl BuilderRegistry {
    /// The standard registry: doxygen, epydoc, sphinx.
    pub fn standard() -> Self {
        Self::from_builders(vec![
            Box::new(DoxygenBuilder::new()),
            Box::new(EpydocBuilder::new()),
            Box::new(SphinxBuilder::new()),
        ])
    }

    /// A registry with the given builders, in the given order.
    ///
    /// A later builder of the same kind replaces an earlier one in place.
    pub fn from_builders(builders: Vec<Box<dyn Builder>>) -> Self {
        let mut deduped: Vec<Box<dyn Builder>> = Vec::with_capacity(builders.len());
        for builder in builders {
            match deduped.iter().position(|b| b.kind() == builder.kind()) {
                Some(index) => deduped[index] = builder,
                None => deduped.push(builder),
            }
        }
        Self { builders: deduped }
    }

    /// Builders in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (BuilderKind, &dyn Builder)> {
        self.builders.iter().map(|b| (b.kind(), b.as_ref()))
    }

    /// Look up a builder by kind.
    pub fn get(&self, kind: BuilderKind) -> Option<&dyn Builder> {
        self.builders
            .iter()
            .find(|b| b.kind() == kind)
            .map(|b| b.as_ref())
    }

    /// Kinds in dispatch order.
    pub fn kinds(&self) -> Vec<BuilderKind> {
        self.builders.iter().map(|b| b.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
