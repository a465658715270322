//! Lazy association loading.
//!
//! Descriptors are looked up in the registry on every call and every call
//! queries the connection; nothing is cached on the owner.

use sqlrecord_core::{
    AssociationDescriptor, Connection, Error, Model, Record, RelationshipKind, Result, Value,
};
use sqlrecord_query::{Select, ThroughJoin};

use crate::session::{Loaded, Session};

impl<C: Connection> Session<'_, C> {
    /// Load a belongs-to association.
    ///
    /// A NULL or unset foreign key yields `None` without querying.
    #[tracing::instrument(level = "debug", skip(self, owner), fields(model = owner.model_name()))]
    pub fn belongs_to(&self, owner: &Record, name: &str) -> Result<Option<Record>> {
        let descriptor = self.registry().lookup(owner.model(), name)?;
        let AssociationDescriptor::BelongsTo(target) = descriptor else {
            return Err(wrong_kind(owner, name, descriptor.kind(), "belongs_to"));
        };

        let Some(key) = owner_value(owner, &target.foreign_key)? else {
            return Ok(None);
        };
        let target_model = self.registry().target_of(descriptor)?;
        let table = self.registry().table_name(target_model)?;

        let (sql, params) = Select::from_table(table)
            .eq(target.primary_key.as_str(), key.clone())
            .build()?;
        let result = self.run(&sql, &params)?;
        self.first(target_model, result)
    }

    /// Load a has-many association, in row order.
    ///
    /// An owner without a key value yields an empty list without querying.
    #[tracing::instrument(level = "debug", skip(self, owner), fields(model = owner.model_name()))]
    pub fn has_many(&self, owner: &Record, name: &str) -> Result<Vec<Record>> {
        let descriptor = self.registry().lookup(owner.model(), name)?;
        let AssociationDescriptor::HasMany(target) = descriptor else {
            return Err(wrong_kind(owner, name, descriptor.kind(), "has_many"));
        };

        let Some(key) = owner_value(owner, &target.primary_key)? else {
            return Ok(Vec::new());
        };
        let target_model = self.registry().target_of(descriptor)?;
        let table = self.registry().table_name(target_model)?;

        let (sql, params) = Select::from_table(table)
            .eq(target.foreign_key.as_str(), key.clone())
            .build()?;
        let result = self.run(&sql, &params)?;
        self.parse_all(target_model, result.into_rows())
    }

    /// Load a has-one-through association with a single JOIN.
    ///
    /// Both legs must be belongs-to associations. A missing leg fails with
    /// [`Error::AssociationNotFound`] naming the side.
    #[tracing::instrument(level = "debug", skip(self, owner), fields(model = owner.model_name()))]
    pub fn has_one_through(&self, owner: &Record, name: &str) -> Result<Option<Record>> {
        let registry = self.registry();
        let through = registry.lookup_through(owner.model(), name)?;
        let (through_leg, source_leg) = registry.through_legs(owner.model(), through)?;
        for leg in [through_leg, source_leg] {
            if leg.kind() != RelationshipKind::BelongsTo {
                return Err(Error::Config(format!(
                    "through association '{}' on {} must be built from belongs_to legs",
                    name,
                    owner.model_name()
                )));
            }
        }

        let Some(key) = owner_value(owner, through_leg.foreign_key())? else {
            return Ok(None);
        };
        let through_model = registry.target_of(through_leg)?;
        let source_model = registry.target_of(source_leg)?;

        let (sql, params) = ThroughJoin {
            through_table: registry.table_name(through_model)?,
            through_primary_key: through_leg.primary_key(),
            source_table: registry.table_name(source_model)?,
            source_foreign_key: source_leg.foreign_key(),
            source_primary_key: source_leg.primary_key(),
        }
        .build(key.clone())?;
        let result = self.run(&sql, &params)?;
        self.first(source_model, result)
    }

    /// Load any association by name, dispatching on its kind.
    pub fn association(&self, owner: &Record, name: &str) -> Result<Loaded> {
        let registry = self.registry();
        match registry.lookup(owner.model(), name) {
            Ok(descriptor) => match descriptor.kind() {
                RelationshipKind::HasMany => self.has_many(owner, name).map(Loaded::Many),
                _ => self.belongs_to(owner, name).map(Loaded::One),
            },
            Err(Error::AssociationNotFound { .. })
                if registry.lookup_through(owner.model(), name).is_ok() =>
            {
                self.has_one_through(owner, name).map(Loaded::One)
            }
            Err(err) => Err(err),
        }
    }

    /// Load a single-valued association as the typed model `T`.
    ///
    /// Fails with [`Error::ModelMismatch`] if the association targets another model.
    pub fn related<T: Model>(&self, owner: &Record, name: &str) -> Result<Option<T>> {
        self.expect_target::<T>(owner, name)?;
        if matches!(
            self.registry().lookup(owner.model(), name),
            Ok(descriptor) if descriptor.kind() == RelationshipKind::HasMany
        ) {
            return Err(wrong_kind(owner, name, RelationshipKind::HasMany, "related"));
        }
        Ok(self.association(owner, name)?.into_one().map(T::from_record))
    }

    /// Load a has-many association as the typed model `T`.
    pub fn related_many<T: Model>(&self, owner: &Record, name: &str) -> Result<Vec<T>> {
        self.expect_target::<T>(owner, name)?;
        Ok(self
            .has_many(owner, name)?
            .into_iter()
            .map(T::from_record)
            .collect())
    }

    fn expect_target<T: Model>(&self, owner: &Record, name: &str) -> Result<()> {
        let found = self.registry().target_model_name(owner.model(), name)?;
        if found == T::NAME {
            Ok(())
        } else {
            Err(Error::ModelMismatch {
                expected: T::NAME.to_string(),
                found: found.to_string(),
            })
        }
    }
}

/// The owner's value for `column`, with NULL and unset both mapped to `None`.
fn owner_value<'r>(owner: &'r Record, column: &str) -> Result<Option<&'r Value>> {
    if owner.position(column).is_none() {
        return Err(Error::UnknownAttribute {
            model: owner.model_name().to_string(),
            attribute: column.to_string(),
        });
    }
    Ok(owner.get(column).filter(|v| !v.is_null()))
}

fn wrong_kind(owner: &Record, name: &str, kind: RelationshipKind, wanted: &str) -> Error {
    Error::Config(format!(
        "association '{}' on {} is {:?}, cannot load it with {}",
        name,
        owner.model_name(),
        kind,
        wanted
    ))
}
