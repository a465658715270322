//! Association metadata for sqlrecord.
//!
//! Models declare associations statically (via `#[derive(Model)]`) as
//! [`RelationshipInfo`] values. When a model is registered, each declaration
//! is turned into an [`AssociationDescriptor`] by applying the naming defaults
//! and then any explicit overrides.

use crate::inflect;

/// The kind of a declared association.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Many-to-one: the owner holds the foreign key (`Player` belongs to `Manager`).
    #[default]
    BelongsTo,
    /// One-to-many: the target holds the foreign key (`Manager` has many `Player`s).
    HasMany,
    /// Two hops composed from two declared associations via a JOIN.
    HasOneThrough,
}

/// Static declaration of an association, as emitted by the derive macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipInfo {
    /// Name of the association accessor.
    pub name: &'static str,

    /// Kind of association.
    pub kind: RelationshipKind,

    /// Explicit foreign key column.
    pub foreign_key: Option<&'static str>,

    /// Explicit target model name.
    pub class_name: Option<&'static str>,

    /// Explicit primary key column on the side the foreign key points at.
    pub primary_key: Option<&'static str>,

    /// For `HasOneThrough`: association on the owner to traverse first.
    pub through: Option<&'static str>,

    /// For `HasOneThrough`: association on the through model to traverse second.
    pub source: Option<&'static str>,
}

impl RelationshipInfo {
    /// Create a declaration with no overrides.
    #[must_use]
    pub const fn new(name: &'static str, kind: RelationshipKind) -> Self {
        Self {
            name,
            kind,
            foreign_key: None,
            class_name: None,
            primary_key: None,
            through: None,
            source: None,
        }
    }

    /// Declare a has-one-through association.
    #[must_use]
    pub const fn through(
        name: &'static str,
        through: &'static str,
        source: &'static str,
    ) -> Self {
        let mut info = Self::new(name, RelationshipKind::HasOneThrough);
        info.through = Some(through);
        info.source = Some(source);
        info
    }

    /// Override the foreign key column.
    #[must_use]
    pub const fn foreign_key(mut self, column: &'static str) -> Self {
        self.foreign_key = Some(column);
        self
    }

    /// Override the target model name.
    #[must_use]
    pub const fn class_name(mut self, model: &'static str) -> Self {
        self.class_name = Some(model);
        self
    }

    /// Override the primary key column.
    #[must_use]
    pub const fn primary_key(mut self, column: &'static str) -> Self {
        self.primary_key = Some(column);
        self
    }

    /// Overrides as owned [`AssocOptions`].
    pub fn options(&self) -> AssocOptions {
        AssocOptions {
            foreign_key: self.foreign_key.map(str::to_string),
            class_name: self.class_name.map(str::to_string),
            primary_key: self.primary_key.map(str::to_string),
        }
    }
}

/// Caller-supplied overrides for a single association.
///
/// Any field left `None` takes its conventional default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssocOptions {
    pub foreign_key: Option<String>,
    pub class_name: Option<String>,
    pub primary_key: Option<String>,
}

impl AssocOptions {
    /// Options with every field defaulted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the foreign key column.
    #[must_use]
    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Override the target model name.
    #[must_use]
    pub fn class_name(mut self, model: impl Into<String>) -> Self {
        self.class_name = Some(model.into());
        self
    }

    /// Override the primary key column.
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }
}

/// The resolved columns and target of a single-hop association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssocTarget {
    /// Column holding the reference.
    pub foreign_key: String,
    /// Name of the target model.
    pub class_name: String,
    /// Column the foreign key refers to.
    pub primary_key: String,
}

/// A registered single-hop association with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationDescriptor {
    BelongsTo(AssocTarget),
    HasMany(AssocTarget),
}

impl AssociationDescriptor {
    /// Resolve a belongs-to association named `name`.
    ///
    /// Defaults: `foreign_key = "<name>_id"`, `class_name = camelize(name)`,
    /// `primary_key = "id"`.
    pub fn belongs_to(name: &str, options: &AssocOptions) -> Self {
        AssociationDescriptor::BelongsTo(AssocTarget {
            foreign_key: options
                .foreign_key
                .clone()
                .unwrap_or_else(|| format!("{}_id", name)),
            class_name: options
                .class_name
                .clone()
                .unwrap_or_else(|| inflect::camelize(name)),
            primary_key: options
                .primary_key
                .clone()
                .unwrap_or_else(|| "id".to_string()),
        })
    }

    /// Resolve a has-many association named `name` declared on `owner`.
    ///
    /// Defaults: `foreign_key = lower(owner) + "_id"`,
    /// `class_name = singularize(camelize(name))`, `primary_key = "id"`.
    pub fn has_many(name: &str, owner: &str, options: &AssocOptions) -> Self {
        AssociationDescriptor::HasMany(AssocTarget {
            foreign_key: options
                .foreign_key
                .clone()
                .unwrap_or_else(|| inflect::foreign_key_for(owner)),
            class_name: options
                .class_name
                .clone()
                .unwrap_or_else(|| inflect::singularize(&inflect::camelize(name))),
            primary_key: options
                .primary_key
                .clone()
                .unwrap_or_else(|| "id".to_string()),
        })
    }

    /// Kind of this association.
    pub const fn kind(&self) -> RelationshipKind {
        match self {
            AssociationDescriptor::BelongsTo(_) => RelationshipKind::BelongsTo,
            AssociationDescriptor::HasMany(_) => RelationshipKind::HasMany,
        }
    }

    /// Columns and target model.
    pub const fn target(&self) -> &AssocTarget {
        match self {
            AssociationDescriptor::BelongsTo(t) | AssociationDescriptor::HasMany(t) => t,
        }
    }

    pub fn foreign_key(&self) -> &str {
        &self.target().foreign_key
    }

    pub fn class_name(&self) -> &str {
        &self.target().class_name
    }

    pub fn primary_key(&self) -> &str {
        &self.target().primary_key
    }
}

/// A registered has-one-through association: the names of its two legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThroughDescriptor {
    /// Association on the owning model.
    pub through: String,
    /// Association on the through association's target model.
    pub source: String,
}
