//! Implementation of the Model derive macro.
//!
//! The derive targets a single-field tuple struct wrapping a `Record` and is
//! driven entirely by `#[sqlrecord(...)]` attributes on the struct.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::meta::ParseNestedMeta;
use syn::{Data, DeriveInput, Error, Fields, Ident, LitStr, Result};

/// Parsed model definition from a struct with `#[derive(Model)]`.
#[derive(Debug)]
pub struct ModelDef {
    /// The struct name.
    pub ident: Ident,
    /// Model name override, defaults to the struct name.
    pub name: Option<String>,
    /// Table name override.
    pub table: Option<String>,
    /// Declared columns, in declaration order.
    pub columns: Vec<Ident>,
    /// Declared associations, in declaration order.
    pub associations: Vec<AssociationDef>,
    /// Generics from the struct.
    pub generics: syn::Generics,
}

/// Kind of a declared association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    BelongsTo,
    HasMany,
    HasOneThrough,
}

/// A single `belongs_to(...)`, `has_many(...)` or `has_one_through(...)` entry.
#[derive(Debug)]
pub struct AssociationDef {
    pub kind: AssociationKind,
    pub name: Ident,
    pub foreign_key: Option<String>,
    pub class_name: Option<String>,
    pub primary_key: Option<String>,
    pub through: Option<String>,
    pub source: Option<String>,
}

/// Parse a `DeriveInput` into a `ModelDef`.
pub fn parse_model(input: &DeriveInput) -> Result<ModelDef> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {}
            _ => {
                return Err(Error::new_spanned(
                    &input.ident,
                    "Model requires a tuple struct with a single Record field, e.g. `struct Player(Record);`",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                "Model can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Model can only be derived for structs, not unions",
            ));
        }
    }

    let mut def = ModelDef {
        ident: input.ident.clone(),
        name: None,
        table: None,
        columns: Vec::new(),
        associations: Vec::new(),
        generics: input.generics.clone(),
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("sqlrecord") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                def.name = Some(value.value());
            } else if path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                def.table = Some(value.value());
            } else if path.is_ident("columns") {
                meta.parse_nested_meta(|column| {
                    let ident = column
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| column.error("expected a column name"))?;
                    if def.columns.contains(&ident) {
                        return Err(Error::new_spanned(&ident, "duplicate column"));
                    }
                    def.columns.push(ident);
                    Ok(())
                })?;
            } else if path.is_ident("belongs_to") {
                def.associations
                    .push(parse_association(&meta, AssociationKind::BelongsTo)?);
            } else if path.is_ident("has_many") {
                def.associations
                    .push(parse_association(&meta, AssociationKind::HasMany)?);
            } else if path.is_ident("has_one_through") {
                def.associations
                    .push(parse_association(&meta, AssociationKind::HasOneThrough)?);
            } else {
                return Err(meta.error(
                    "unknown sqlrecord attribute; expected one of: name, table, columns, belongs_to, has_many, has_one_through",
                ));
            }

            Ok(())
        })?;
    }

    for (i, assoc) in def.associations.iter().enumerate() {
        if def.associations[..i].iter().any(|a| a.name == assoc.name) {
            return Err(Error::new_spanned(
                &assoc.name,
                format!("association `{}` is declared twice", assoc.name),
            ));
        }
        if def.columns.contains(&assoc.name) {
            return Err(Error::new_spanned(
                &assoc.name,
                format!("association `{}` clashes with a column accessor", assoc.name),
            ));
        }
    }

    Ok(def)
}

/// Parse the contents of one association entry: a bare name followed by
/// `key = "value"` options.
fn parse_association(meta: &ParseNestedMeta<'_>, kind: AssociationKind) -> Result<AssociationDef> {
    let mut name: Option<Ident> = None;
    let mut foreign_key = None;
    let mut class_name = None;
    let mut primary_key = None;
    let mut through = None;
    let mut source = None;

    meta.parse_nested_meta(|inner| {
        let path = &inner.path;

        if !inner.input.peek(syn::Token![=]) {
            if name.is_some() {
                return Err(inner.error("association name given twice"));
            }
            name = Some(
                path.get_ident()
                    .cloned()
                    .ok_or_else(|| inner.error("expected an association name"))?,
            );
            return Ok(());
        }

        let value: LitStr = inner.value()?.parse()?;
        let direct = kind != AssociationKind::HasOneThrough;
        let slot = if direct && path.is_ident("foreign_key") {
            &mut foreign_key
        } else if direct && path.is_ident("class_name") {
            &mut class_name
        } else if direct && path.is_ident("primary_key") {
            &mut primary_key
        } else if !direct && path.is_ident("through") {
            &mut through
        } else if !direct && path.is_ident("source") {
            &mut source
        } else {
            return Err(inner.error(match kind {
                AssociationKind::HasOneThrough => "expected `through` or `source`",
                _ => "expected one of: foreign_key, class_name, primary_key",
            }));
        };
        *slot = Some(value.value());
        Ok(())
    })?;

    let Some(name) = name else {
        return Err(meta.error("association requires a name as its first argument"));
    };
    if kind == AssociationKind::HasOneThrough && (through.is_none() || source.is_none()) {
        return Err(meta.error("has_one_through requires both `through` and `source`"));
    }

    Ok(AssociationDef {
        kind,
        name,
        foreign_key,
        class_name,
        primary_key,
        through,
        source,
    })
}

/// Generate the `Model` impl and the accessor methods.
pub fn generate_model_impl(def: &ModelDef) -> TokenStream {
    let ident = &def.ident;
    let (impl_generics, ty_generics, where_clause) = def.generics.split_for_impl();

    let model_name = def.name.clone().unwrap_or_else(|| ident.to_string());
    let table_name = match &def.table {
        Some(table) => quote! { ::core::option::Option::Some(#table) },
        None => quote! { ::core::option::Option::None },
    };
    let column_names = def.columns.iter().map(ToString::to_string);
    let relationships = def.associations.iter().map(generate_relationship_info);
    let column_accessors = def.columns.iter().map(generate_column_accessors);
    let association_accessors = def.associations.iter().map(generate_association_accessor);

    quote! {
        impl #impl_generics ::sqlrecord::Model for #ident #ty_generics #where_clause {
            const NAME: &'static str = #model_name;
            const TABLE_NAME: ::core::option::Option<&'static str> = #table_name;
            const COLUMNS: &'static [&'static str] = &[#(#column_names),*];
            const RELATIONSHIPS: &'static [::sqlrecord::RelationshipInfo] = &[#(#relationships),*];

            fn from_record(record: ::sqlrecord::Record) -> Self {
                Self(record)
            }

            fn record(&self) -> &::sqlrecord::Record {
                &self.0
            }

            fn record_mut(&mut self) -> &mut ::sqlrecord::Record {
                &mut self.0
            }

            fn into_record(self) -> ::sqlrecord::Record {
                self.0
            }
        }

        impl #impl_generics #ident #ty_generics #where_clause {
            #(#column_accessors)*
            #(#association_accessors)*
        }
    }
}

fn generate_relationship_info(assoc: &AssociationDef) -> TokenStream {
    let name = assoc.name.to_string();

    if assoc.kind == AssociationKind::HasOneThrough {
        let through = assoc.through.as_deref().unwrap_or_default();
        let source = assoc.source.as_deref().unwrap_or_default();
        return quote! {
            ::sqlrecord::RelationshipInfo::through(#name, #through, #source)
        };
    }

    let kind = match assoc.kind {
        AssociationKind::HasMany => quote! { ::sqlrecord::RelationshipKind::HasMany },
        _ => quote! { ::sqlrecord::RelationshipKind::BelongsTo },
    };
    let mut tokens = quote! { ::sqlrecord::RelationshipInfo::new(#name, #kind) };
    if let Some(fk) = &assoc.foreign_key {
        tokens = quote! { #tokens.foreign_key(#fk) };
    }
    if let Some(class_name) = &assoc.class_name {
        tokens = quote! { #tokens.class_name(#class_name) };
    }
    if let Some(pk) = &assoc.primary_key {
        tokens = quote! { #tokens.primary_key(#pk) };
    }
    tokens
}

fn generate_column_accessors(column: &Ident) -> TokenStream {
    let column_name = column.to_string();
    let setter = format_ident!("set_{}", column);
    let get_doc = format!("Value of `{}`, if set.", column_name);
    let set_doc = format!("Assign `{}`.", column_name);

    quote! {
        #[doc = #get_doc]
        pub fn #column(&self) -> ::core::option::Option<&::sqlrecord::Value> {
            self.0.get(#column_name)
        }

        #[doc = #set_doc]
        pub fn #setter(
            &mut self,
            value: impl ::core::convert::Into<::sqlrecord::Value>,
        ) -> ::sqlrecord::Result<()> {
            self.0.set(#column_name, value)
        }
    }
}

fn generate_association_accessor(assoc: &AssociationDef) -> TokenStream {
    let accessor = &assoc.name;
    let name = assoc.name.to_string();

    match assoc.kind {
        AssociationKind::BelongsTo => {
            let doc = format!("Load the `{}` this record belongs to.", name);
            quote! {
                #[doc = #doc]
                pub fn #accessor<C: ::sqlrecord::Connection>(
                    &self,
                    session: &::sqlrecord::Session<'_, C>,
                ) -> ::sqlrecord::Result<::core::option::Option<::sqlrecord::Record>> {
                    session.belongs_to(&self.0, #name)
                }
            }
        }
        AssociationKind::HasMany => {
            let doc = format!("Load every `{}` record referring to this one.", name);
            quote! {
                #[doc = #doc]
                pub fn #accessor<C: ::sqlrecord::Connection>(
                    &self,
                    session: &::sqlrecord::Session<'_, C>,
                ) -> ::sqlrecord::Result<::std::vec::Vec<::sqlrecord::Record>> {
                    session.has_many(&self.0, #name)
                }
            }
        }
        AssociationKind::HasOneThrough => {
            let doc = format!("Load `{}` through a two-hop join.", name);
            quote! {
                #[doc = #doc]
                pub fn #accessor<C: ::sqlrecord::Connection>(
                    &self,
                    session: &::sqlrecord::Session<'_, C>,
                ) -> ::sqlrecord::Result<::core::option::Option<::sqlrecord::Record>> {
                    session.has_one_through(&self.0, #name)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ModelDef> {
        let input: DeriveInput = syn::parse_str(src).unwrap();
        parse_model(&input)
    }

    #[test]
    fn test_parse_columns_and_associations() {
        let def = parse(
            r#"
            #[sqlrecord(table = "managers", columns(id, fname, lname, team_id))]
            #[sqlrecord(has_many(players, foreign_key = "manager_id"), belongs_to(team))]
            struct Manager(Record);
            "#,
        )
        .unwrap();

        assert_eq!(def.table.as_deref(), Some("managers"));
        let columns: Vec<String> = def.columns.iter().map(ToString::to_string).collect();
        assert_eq!(columns, ["id", "fname", "lname", "team_id"]);
        assert_eq!(def.associations.len(), 2);
        assert_eq!(def.associations[0].kind, AssociationKind::HasMany);
        assert_eq!(def.associations[0].foreign_key.as_deref(), Some("manager_id"));
        assert_eq!(def.associations[1].name, "team");
    }

    #[test]
    fn test_parse_through() {
        let def = parse(
            r#"
            #[sqlrecord(columns(id, name, manager_id))]
            #[sqlrecord(belongs_to(manager), has_one_through(team, through = "manager", source = "team"))]
            struct Player(Record);
            "#,
        )
        .unwrap();
        let through = &def.associations[1];
        assert_eq!(through.kind, AssociationKind::HasOneThrough);
        assert_eq!(through.through.as_deref(), Some("manager"));
        assert_eq!(through.source.as_deref(), Some("team"));
    }

    #[test]
    fn test_through_requires_both_legs() {
        let err = parse(
            r#"
            #[sqlrecord(has_one_through(team, through = "manager"))]
            struct Player(Record);
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("through"));
    }

    #[test]
    fn test_rejects_named_fields() {
        assert!(parse("struct Player { record: Record }").is_err());
    }

    #[test]
    fn test_rejects_duplicate_association() {
        assert!(parse("#[sqlrecord(belongs_to(team), has_many(team))] struct Player(Record);").is_err());
    }

    #[test]
    fn test_rejects_through_option_on_belongs_to() {
        assert!(parse(r#"#[sqlrecord(belongs_to(team, through = "x"))] struct Player(Record);"#).is_err());
    }

    #[test]
    fn test_generated_setter_names() {
        let def = parse("#[sqlrecord(columns(id, fname))] struct Manager(Record);").unwrap();
        let out = generate_model_impl(&def).to_string();
        assert!(out.contains("set_fname"));
        assert!(out.contains("\"Manager\""));
    }
}
