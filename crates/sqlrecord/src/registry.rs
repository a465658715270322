//! Model and association registry.
//!
//! A [`Registry`] is built once during setup with a [`RegistryBuilder`] and
//! then shared immutably by every [`Session`](crate::Session). It owns, per
//! model type:
//!
//! - the model name and table name,
//! - the association descriptors (after defaulting),
//! - the through-association descriptors,
//! - the Schema Cache slot holding the introspected column set.
//!
//! Registries built separately share nothing, including cached schemas.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sqlrecord_core::{
    AssocOptions, AssociationDescriptor, Error, Model, ModelId, RelationshipKind, Result,
    ThroughDescriptor, ThroughSide, inflect, validate_identifier,
};

use crate::schema::SchemaSlot;

/// Everything registered for one model type.
#[derive(Debug)]
pub struct ModelEntry {
    id: ModelId,
    name: Arc<str>,
    table_name: String,
    declared_columns: Vec<String>,
    associations: BTreeMap<String, AssociationDescriptor>,
    through: BTreeMap<String, ThroughDescriptor>,
    schema: SchemaSlot,
}

impl ModelEntry {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Columns the model declared accessors for (empty for untyped models).
    pub fn declared_columns(&self) -> &[String] {
        &self.declared_columns
    }

    /// Single-hop associations by name.
    pub fn associations(&self) -> &BTreeMap<String, AssociationDescriptor> {
        &self.associations
    }

    /// Through-associations by name.
    pub fn through_associations(&self) -> &BTreeMap<String, ThroughDescriptor> {
        &self.through
    }

    /// Introspected column set, if it has been loaded.
    pub fn cached_columns(&self) -> Option<Arc<[String]>> {
        self.schema.get()
    }

    pub(crate) fn schema(&self) -> &SchemaSlot {
        &self.schema
    }
}

/// Immutable registry of model types and their associations.
#[derive(Debug, Default)]
pub struct Registry {
    models: Vec<ModelEntry>,
    by_name: HashMap<String, ModelId>,
}

impl Registry {
    /// Start a new setup phase.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Id of the model registered under `name`.
    pub fn model_id(&self, name: &str) -> Result<ModelId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownModel(name.to_string()))
    }

    /// Id of a typed model.
    pub fn model_id_of<M: Model>(&self) -> Result<ModelId> {
        self.model_id(M::NAME)
    }

    /// Entry for `id`.
    pub fn entry(&self, id: ModelId) -> Result<&ModelEntry> {
        self.models
            .get(id.index())
            .ok_or_else(|| Error::UnknownModel(id.to_string()))
    }

    pub fn model_name(&self, id: ModelId) -> Result<&str> {
        Ok(self.entry(id)?.name())
    }

    pub fn table_name(&self, id: ModelId) -> Result<&str> {
        Ok(self.entry(id)?.table_name())
    }

    /// Every registered model, in registration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelEntry> {
        self.models.iter()
    }

    /// Single-hop association `name` on `model`.
    pub fn lookup(&self, model: ModelId, name: &str) -> Result<&AssociationDescriptor> {
        let entry = self.entry(model)?;
        entry
            .associations
            .get(name)
            .ok_or_else(|| Error::AssociationNotFound {
                model: entry.name().to_string(),
                name: name.to_string(),
                side: None,
            })
    }

    /// Through-association `name` on `model`.
    pub fn lookup_through(&self, model: ModelId, name: &str) -> Result<&ThroughDescriptor> {
        let entry = self.entry(model)?;
        entry
            .through
            .get(name)
            .ok_or_else(|| Error::AssociationNotFound {
                model: entry.name().to_string(),
                name: name.to_string(),
                side: None,
            })
    }

    /// All single-hop associations of `model`; empty if none were registered.
    pub fn associations(&self, model: ModelId) -> Result<&BTreeMap<String, AssociationDescriptor>> {
        Ok(self.entry(model)?.associations())
    }

    /// Model id the descriptor points at.
    pub fn target_of(&self, descriptor: &AssociationDescriptor) -> Result<ModelId> {
        self.model_id(descriptor.class_name())
    }

    /// Name of the model an association on `model` resolves to.
    ///
    /// For a through-association this is the target of its source leg.
    pub fn target_model_name(&self, model: ModelId, name: &str) -> Result<&str> {
        if let Ok(descriptor) = self.lookup(model, name) {
            return Ok(descriptor.class_name());
        }
        let through = self.lookup_through(model, name)?;
        let (_, source) = self.through_legs(model, through)?;
        Ok(source.class_name())
    }

    /// Resolve both legs of a through-association.
    pub fn through_legs(
        &self,
        model: ModelId,
        through: &ThroughDescriptor,
    ) -> Result<(&AssociationDescriptor, &AssociationDescriptor)> {
        let through_leg = self
            .lookup(model, &through.through)
            .map_err(|e| on_side(e, ThroughSide::Through))?;
        let through_model = self.target_of(through_leg)?;
        let source_leg = self
            .lookup(through_model, &through.source)
            .map_err(|e| on_side(e, ThroughSide::Source))?;
        Ok((through_leg, source_leg))
    }
}

fn on_side(err: Error, side: ThroughSide) -> Error {
    match err {
        Error::AssociationNotFound { model, name, .. } => Error::AssociationNotFound {
            model,
            name,
            side: Some(side),
        },
        other => other,
    }
}

#[derive(Debug)]
struct PendingModel {
    name: String,
    table_name: String,
    declared_columns: Vec<String>,
    associations: BTreeMap<String, AssociationDescriptor>,
    through: BTreeMap<String, ThroughDescriptor>,
}

impl PendingModel {
    fn has_association(&self, name: &str) -> bool {
        self.associations.contains_key(name) || self.through.contains_key(name)
    }
}

/// Setup-phase builder for a [`Registry`].
///
/// Association calls apply to the most recently added model. The first
/// configuration error is kept and reported by [`RegistryBuilder::build`].
///
/// # Example
///
/// ```
/// use sqlrecord::{AssocOptions, Registry};
///
/// let registry = Registry::builder()
///     .model_named("Player", None)
///     .belongs_to("manager", AssocOptions::new())
///     .model_named("Manager", None)
///     .has_many("players", AssocOptions::new())
///     .build()
///     .unwrap();
///
/// let manager = registry.model_id("Manager").unwrap();
/// let players = registry.lookup(manager, "players").unwrap();
/// assert_eq!(players.foreign_key(), "manager_id");
/// assert_eq!(registry.table_name(manager).unwrap(), "managers");
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    models: Vec<PendingModel>,
    error: Option<Error>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed model with its declared columns and associations.
    pub fn model<M: Model>(mut self) -> Self {
        self.push_model(M::NAME, M::TABLE_NAME, M::COLUMNS);
        for rel in M::RELATIONSHIPS {
            self = match rel.kind {
                RelationshipKind::BelongsTo => self.belongs_to(rel.name, rel.options()),
                RelationshipKind::HasMany => self.has_many(rel.name, rel.options()),
                RelationshipKind::HasOneThrough => self.has_one_through(
                    rel.name,
                    rel.through.unwrap_or_default(),
                    rel.source.unwrap_or_default(),
                ),
            };
        }
        self
    }

    /// Register a model by name; `table` defaults to the pluralized, lower-cased name.
    pub fn model_named(mut self, name: &str, table: Option<&str>) -> Self {
        self.push_model(name, table, &[]);
        self
    }

    /// Declare a belongs-to association on the current model.
    pub fn belongs_to(mut self, name: &str, options: AssocOptions) -> Self {
        let descriptor = AssociationDescriptor::belongs_to(name, &options);
        self.push_association(name, descriptor);
        self
    }

    /// Declare a has-many association on the current model.
    pub fn has_many(mut self, name: &str, options: AssocOptions) -> Self {
        let Some(owner) = self.models.last().map(|m| m.name.clone()) else {
            self.fail(Error::Config(format!(
                "has_many '{}' declared before any model",
                name
            )));
            return self;
        };
        let descriptor = AssociationDescriptor::has_many(name, &owner, &options);
        self.push_association(name, descriptor);
        self
    }

    /// Declare a has-one-through association on the current model.
    ///
    /// The legs are only resolved when the association is loaded.
    pub fn has_one_through(mut self, name: &str, through: &str, source: &str) -> Self {
        if through.is_empty() || source.is_empty() {
            self.fail(Error::Config(format!(
                "has_one_through '{}' needs both a through and a source association",
                name
            )));
            return self;
        }
        let Some(model) = self.current(name) else {
            return self;
        };
        if model.has_association(name) {
            let msg = format!("association '{}' declared twice on {}", name, model.name);
            self.fail(Error::Config(msg));
            return self;
        }
        model.through.insert(
            name.to_string(),
            ThroughDescriptor {
                through: through.to_string(),
                source: source.to_string(),
            },
        );
        self
    }

    /// Finish setup.
    pub fn build(self) -> Result<Registry> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut registry = Registry::default();
        for (index, pending) in self.models.into_iter().enumerate() {
            let id = ModelId::new(index);
            registry.by_name.insert(pending.name.clone(), id);
            registry.models.push(ModelEntry {
                id,
                name: pending.name.into(),
                table_name: pending.table_name,
                declared_columns: pending.declared_columns,
                associations: pending.associations,
                through: pending.through,
                schema: SchemaSlot::new(),
            });
        }

        tracing::debug!(models = registry.models.len(), "Built model registry");
        Ok(registry)
    }

    fn push_model(&mut self, name: &str, table: Option<&str>, columns: &[&str]) {
        if self.models.iter().any(|m| m.name == name) {
            self.fail(Error::Config(format!("model '{}' registered twice", name)));
            return;
        }
        let table_name = table.map_or_else(|| inflect::table_name_for(name), str::to_string);
        if let Err(err) = validate_identifier(&table_name) {
            self.fail(err);
            return;
        }
        self.models.push(PendingModel {
            name: name.to_string(),
            table_name,
            declared_columns: columns.iter().map(|c| (*c).to_string()).collect(),
            associations: BTreeMap::new(),
            through: BTreeMap::new(),
        });
    }

    fn push_association(&mut self, name: &str, descriptor: AssociationDescriptor) {
        let Some(model) = self.current(name) else {
            return;
        };
        if model.has_association(name) {
            let msg = format!("association '{}' declared twice on {}", name, model.name);
            self.fail(Error::Config(msg));
            return;
        }
        model.associations.insert(name.to_string(), descriptor);
    }

    fn current(&mut self, association: &str) -> Option<&mut PendingModel> {
        if self.models.is_empty() {
            self.fail(Error::Config(format!(
                "association '{}' declared before any model",
                association
            )));
            return None;
        }
        self.models.last_mut()
    }

    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseball() -> Registry {
        Registry::builder()
            .model_named("Team", None)
            .has_many("managers", AssocOptions::new())
            .model_named("Manager", None)
            .belongs_to("team", AssocOptions::new())
            .has_many("players", AssocOptions::new())
            .model_named("Player", None)
            .belongs_to("manager", AssocOptions::new())
            .has_one_through("team", "manager", "team")
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_table_names() {
        let registry = baseball();
        let player = registry.model_id("Player").unwrap();
        assert_eq!(registry.table_name(player).unwrap(), "players");
        assert_eq!(registry.model_name(player).unwrap(), "Player");
    }

    #[test]
    fn test_table_override() {
        let registry = Registry::builder()
            .model_named("Person", Some("people"))
            .build()
            .unwrap();
        let person = registry.model_id("Person").unwrap();
        assert_eq!(registry.table_name(person).unwrap(), "people");
    }

    #[test]
    fn test_lookup_and_defaults() {
        let registry = baseball();
        let manager = registry.model_id("Manager").unwrap();

        let team = registry.lookup(manager, "team").unwrap();
        assert_eq!(team.kind(), RelationshipKind::BelongsTo);
        assert_eq!(team.foreign_key(), "team_id");
        assert_eq!(team.class_name(), "Team");

        let players = registry.lookup(manager, "players").unwrap();
        assert_eq!(players.kind(), RelationshipKind::HasMany);
        assert_eq!(players.foreign_key(), "manager_id");
        assert_eq!(players.class_name(), "Player");
    }

    #[test]
    fn test_lookup_missing() {
        let registry = baseball();
        let team = registry.model_id("Team").unwrap();
        let err = registry.lookup(team, "owner").unwrap_err();
        assert!(matches!(err, Error::AssociationNotFound { ref name, side: None, .. } if name == "owner"));
    }

    #[test]
    fn test_all_for_is_empty_without_registrations() {
        let registry = Registry::builder()
            .model_named("Cat", None)
            .build()
            .unwrap();
        let cat = registry.model_id("Cat").unwrap();
        assert!(registry.associations(cat).unwrap().is_empty());
    }

    #[test]
    fn test_registries_are_independent_per_model() {
        let registry = baseball();
        let team = registry.model_id("Team").unwrap();
        let player = registry.model_id("Player").unwrap();
        assert!(registry.lookup(team, "manager").is_err());
        assert!(registry.lookup(player, "manager").is_ok());
        assert_eq!(registry.associations(team).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_association_rejected() {
        let err = Registry::builder()
            .model_named("Player", None)
            .belongs_to("manager", AssocOptions::new())
            .has_one_through("manager", "team", "manager")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let err = Registry::builder()
            .model_named("Player", None)
            .model_named("Player", Some("ballplayers"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_association_before_model_rejected() {
        let err = Registry::builder()
            .belongs_to("team", AssocOptions::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let err = Registry::builder()
            .model_named("Player", Some("players; DROP TABLE teams"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }

    #[test]
    fn test_through_legs_name_missing_side() {
        let registry = Registry::builder()
            .model_named("Team", None)
            .model_named("Manager", None)
            .belongs_to("team", AssocOptions::new())
            .model_named("Player", None)
            .belongs_to("manager", AssocOptions::new())
            .has_one_through("home", "manager", "house")
            .has_one_through("club", "coach", "team")
            .build()
            .unwrap();
        let player = registry.model_id("Player").unwrap();

        let home = registry.lookup_through(player, "home").unwrap();
        let err = registry.through_legs(player, home).unwrap_err();
        assert!(matches!(err, Error::AssociationNotFound { side: Some(ThroughSide::Source), .. }));

        let club = registry.lookup_through(player, "club").unwrap();
        let err = registry.through_legs(player, club).unwrap_err();
        assert!(matches!(err, Error::AssociationNotFound { side: Some(ThroughSide::Through), .. }));
    }

    #[test]
    fn test_target_model_name() {
        let registry = baseball();
        let player = registry.model_id("Player").unwrap();
        assert_eq!(registry.target_model_name(player, "manager").unwrap(), "Manager");
        assert_eq!(registry.target_model_name(player, "team").unwrap(), "Team");
        assert!(registry.target_model_name(player, "owner").is_err());
    }

    #[test]
    fn test_unknown_model() {
        let registry = baseball();
        assert!(matches!(
            registry.model_id("Umpire"),
            Err(Error::UnknownModel(ref n)) if n == "Umpire"
        ));
    }
}
