//! Flattening of attributes and request parameters.
//!
//! Both are trees of named values: an object-valued `value-type` nests
//! another set of members below its owner. Each level is written as a
//! whole before the levels nested in it, and alternative/requires edges of
//! a level go out once all of its members exist.

use std::collections::HashSet;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use mga_core::dmr::{
    self, ACCESS_CONSTRAINTS, ACCESS_TYPE, ALIAS, ALLOWED, ALTERNATIVES, ATTRIBUTE_GROUP,
    CAPABILITY_REFERENCE, DEFAULT, DEPRECATED, DESCRIPTION, EXPRESSIONS_ALLOWED, MAX, MAX_LENGTH,
    MIN, MIN_LENGTH, NAME, NILLABLE, REQUIRED, REQUIRES, RESTART_REQUIRED, SENSITIVE, STABILITY,
    STORAGE, TYPE, UNIT, VALUE_TYPE,
};
use mga_core::ModelReader;

use super::{value_type, Analyzer, Run};
use crate::cypher::Properties;
use crate::statements::{self, Owner, SiblingRelation};
use crate::writer::{GraphWriter, WriteCounters};

/// Members sharing one parent, `path` naming the chain of parents below the owner.
struct Level<'v> {
    path: Vec<String>,
    members: &'v Value,
}

impl<R, W> Analyzer<'_, R, W>
where
    R: ModelReader + ?Sized,
    W: GraphWriter + ?Sized,
{
    /// Write the member tree `members` below `owner`.
    pub(super) async fn members(&self, run: &mut Run, owner: Owner<'_>, members: &Value) -> Result<()> {
        let mut levels = vec![Level { path: Vec::new(), members }];

        while let Some(level) = levels.pop() {
            let mut nested = Vec::new();
            let mut relations: Vec<(String, String, SiblingRelation)> = Vec::new();
            let members = dmr::properties(level.members);
            let siblings: HashSet<&str> = members.iter().map(|(name, _)| *name).collect();

            for (name, member) in members.iter().copied() {
                let props = member_properties(&owner, name, member);
                let created = self
                    .execute(&statements::create_member(&owner, &level.path, props))
                    .await?;
                count_members(run, &owner, created);

                if let Some(deprecated) = dmr::defined(member, DEPRECATED) {
                    let target = statements::match_member(&owner, &level.path, name);
                    self.deprecated(run, deprecated, target, "m", || owner.context(&level.path, name))
                        .await?;
                }

                if let Some(capability) = dmr::defined(member, CAPABILITY_REFERENCE) {
                    let capability = dmr::as_string(capability);
                    if self.capability_exists(run, &capability).await? {
                        let created = self
                            .execute(&statements::references_capability(&owner, &level.path, name, &capability))
                            .await?;
                        run.stats.relationships += created.relationships_created;
                    } else {
                        debug!(
                            member = %owner.context(&level.path, name),
                            %capability,
                            "Skip reference to unknown capability"
                        );
                    }
                }

                if let Owner::Resource(_) = owner {
                    self.sensitive(run, &owner, &level.path, name, member).await?;
                }

                for (key, relation) in [
                    (ALTERNATIVES, SiblingRelation::Alternative),
                    (REQUIRES, SiblingRelation::Requires),
                ] {
                    if let Some(targets) = dmr::defined(member, key) {
                        for target in dmr::strings(targets) {
                            if siblings.contains(target.as_str()) {
                                relations.push((name.to_string(), target, relation));
                            } else {
                                debug!(
                                    member = %owner.context(&level.path, name),
                                    %target,
                                    "Skip relation to unknown sibling"
                                );
                            }
                        }
                    }
                }

                if let Some(structure) = dmr::defined(member, VALUE_TYPE).filter(|v| dmr::is_nested(v)) {
                    let mut path = level.path.clone();
                    path.push(name.to_string());
                    nested.push(Level { path, members: structure });
                }
            }

            for (source, target, relation) in relations {
                let created = self
                    .execute(&statements::sibling_relation(&owner, &level.path, &source, &target, relation))
                    .await?;
                run.stats.relationships += created.relationships_created;
            }

            // reversed, so nested levels are written in declaration order
            levels.extend(nested.into_iter().rev());
        }
        Ok(())
    }

    async fn sensitive(
        &self,
        run: &mut Run,
        owner: &Owner<'_>,
        path: &[String],
        name: &str,
        member: &Value,
    ) -> Result<()> {
        let Some(sensitive) = dmr::defined(member, ACCESS_CONSTRAINTS)
            .and_then(|constraints| dmr::defined(constraints, SENSITIVE))
        else {
            return Ok(());
        };
        for (sensitive_name, constraint) in dmr::properties(sensitive) {
            let kind = dmr::defined(constraint, TYPE).map(dmr::as_string).unwrap_or_default();
            let created = self
                .execute(&statements::sensitive(owner, path, name, sensitive_name, &kind))
                .await?;
            run.stats.sensitive += created.nodes_created;
            run.stats.relationships += created.relationships_created;
        }
        Ok(())
    }
}

fn count_members(run: &mut Run, owner: &Owner<'_>, created: WriteCounters) {
    match owner {
        Owner::Resource(_) => run.stats.attributes += created.nodes_created,
        Owner::Operation { .. } => run.stats.parameters += created.nodes_created,
    }
    run.stats.relationships += created.relationships_created;
}

fn member_properties(owner: &Owner<'_>, name: &str, member: &Value) -> Properties {
    let string = |key: &str| dmr::defined(member, key).map(dmr::as_string);
    let boolean = |key: &str| dmr::defined(member, key).and_then(dmr::as_bool);
    let number = |key: &str| dmr::defined(member, key).and_then(dmr::as_i64);

    let mut props = Properties::new().with(NAME, name);
    props
        .set_opt(ALLOWED, dmr::defined(member, ALLOWED).map(dmr::strings))
        .set_opt(EXPRESSIONS_ALLOWED, boolean(EXPRESSIONS_ALLOWED))
        .set_opt(MAX, number(MAX))
        .set_opt(MAX_LENGTH, number(MAX_LENGTH))
        .set_opt(MIN, number(MIN))
        .set_opt(MIN_LENGTH, number(MIN_LENGTH))
        .set_opt(NILLABLE, boolean(NILLABLE))
        .set_opt(REQUIRED, boolean(REQUIRED))
        .set_opt(STABILITY, string(STABILITY))
        .set_opt(TYPE, string(TYPE))
        .set_opt(UNIT, string(UNIT))
        .set_opt(VALUE_TYPE, dmr::defined(member, VALUE_TYPE).map(value_type));

    match owner {
        Owner::Resource(_) => {
            props
                .set_opt(ACCESS_TYPE, string(ACCESS_TYPE))
                .set_opt(ALIAS, string(ALIAS))
                .set_opt(ATTRIBUTE_GROUP, string(ATTRIBUTE_GROUP))
                .set_opt(DEFAULT, string(DEFAULT))
                .set_opt(DESCRIPTION, string(DESCRIPTION))
                .set_opt(RESTART_REQUIRED, string(RESTART_REQUIRED))
                .set_opt(STORAGE, string(STORAGE));
        }
        Owner::Operation { .. } => {
            props.set_opt(DESCRIPTION, string(DESCRIPTION));
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher::Param;
    use mga_core::AddressPath;
    use serde_json::json;

    #[test]
    fn test_attribute_properties() {
        let address = AddressPath::root();
        let owner = Owner::Resource(&address);
        let props = member_properties(
            &owner,
            "mode",
            &json!({
                "type": {"TYPE_MODEL_VALUE": "STRING"},
                "allowed": ["SYNC", "ASYNC"],
                "default": {"EXPRESSION_VALUE": "${mode:SYNC}"},
                "nillable": true,
                "max-length": 2147483647,
                "description": "The mode",
                "value-type": {"TYPE_MODEL_VALUE": "STRING"},
            }),
        );
        assert_eq!(props.get(NAME), Some(&Param::String("mode".into())));
        assert_eq!(props.get(TYPE), Some(&Param::String("STRING".into())));
        assert_eq!(
            props.get(ALLOWED),
            Some(&Param::List(vec!["SYNC".into(), "ASYNC".into()]))
        );
        assert_eq!(props.get(DEFAULT), Some(&Param::String("${mode:SYNC}".into())));
        assert_eq!(props.get(NILLABLE), Some(&Param::Bool(true)));
        assert_eq!(props.get(MAX_LENGTH), Some(&Param::Int(2147483647)));
        assert_eq!(props.get(VALUE_TYPE), Some(&Param::String("STRING".into())));
        assert_eq!(props.get(REQUIRED), None);
    }

    #[test]
    fn test_parameter_properties() {
        let address = AddressPath::root();
        let owner = Owner::Operation { address: &address, name: "add" };
        let props = member_properties(
            &owner,
            "credential",
            &json!({
                "type": "OBJECT",
                "description": "Credential",
                "storage": "configuration",
                "value-type": {"user": {"type": "STRING"}},
            }),
        );
        assert_eq!(props.get(VALUE_TYPE), Some(&Param::String("OBJECT".into())));
        assert_eq!(props.get(DESCRIPTION), Some(&Param::String("Credential".into())));
        assert_eq!(props.get(STORAGE), None);
    }
}
