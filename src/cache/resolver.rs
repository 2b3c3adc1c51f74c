use crate::cache::invocation::{ParameterMapping, StatementInvocation};
use crate::cache::{MappedStatement, SqlCommandType};
use crate::error::ResolveError;

/// SQL text and placeholder mappings rebuilt for an invocation whose bound
/// SQL came through blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSql {
    pub sql: String,
    pub parameter_mappings: Vec<ParameterMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlSource {
    Supplied,
    Resolved(ResolvedSql),
    /// Blank text could not be rebuilt; the key holds a null SQL component.
    Degraded(ResolveError),
}

impl SqlSource {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SqlSource::Degraded(_))
    }
}

pub trait SqlTextResolver: Send + Sync {
    fn resolve(
        &self,
        statement: Option<&MappedStatement>,
        invocation: &StatementInvocation<'_>,
    ) -> Result<ResolvedSql, ResolveError>;
}

/// Rebuilds select statements from their configured `#{property}` template.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateResolver;

impl SqlTextResolver for TemplateResolver {
    fn resolve(
        &self,
        statement: Option<&MappedStatement>,
        invocation: &StatementInvocation<'_>,
    ) -> Result<ResolvedSql, ResolveError> {
        let Some(statement) = statement else {
            return Err(ResolveError::NoSqlSource(invocation.statement_id.to_string()));
        };
        if statement.command != SqlCommandType::Select {
            return Err(ResolveError::UnsupportedCommand {
                id: statement.id.clone(),
                command: statement.command.as_str(),
            });
        }
        if statement.sql.trim().is_empty() {
            return Err(ResolveError::NoSqlSource(statement.id.clone()));
        }
        parse_sql_template(&statement.id, &statement.sql)
    }
}

/// Never rebuilds anything. Keys for blank-SQL invocations always carry a
/// null SQL component.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderResolver;

impl SqlTextResolver for PlaceholderResolver {
    fn resolve(
        &self,
        _statement: Option<&MappedStatement>,
        invocation: &StatementInvocation<'_>,
    ) -> Result<ResolvedSql, ResolveError> {
        Err(ResolveError::NoSqlSource(invocation.statement_id.to_string()))
    }
}

/// Rewrites each `#{property[,option=value...]}` to `?` and collects the
/// property names, in order, as parameter mappings.
pub fn parse_sql_template(id: &str, template: &str) -> Result<ResolvedSql, ResolveError> {
    let mut sql = String::with_capacity(template.len());
    let mut parameter_mappings = Vec::new();
    let mut rest = template;
    let mut consumed = 0;

    while let Some(start) = rest.find("#{") {
        sql.push_str(&rest[..start]);
        let body_start = start + 2;
        let Some(len) = rest[body_start..].find('}') else {
            return Err(ResolveError::UnterminatedPlaceholder {
                id: id.to_string(),
                offset: consumed + start,
            });
        };
        let body = &rest[body_start..body_start + len];
        let property = body.split(',').next().unwrap_or_default().trim();
        if property.is_empty() {
            return Err(ResolveError::EmptyPlaceholder {
                id: id.to_string(),
                offset: consumed + start,
            });
        }
        sql.push('?');
        parameter_mappings.push(ParameterMapping::new(property));

        let next = body_start + len + 1;
        consumed += next;
        rest = &rest[next..];
    }
    sql.push_str(rest);

    Ok(ResolvedSql {
        sql,
        parameter_mappings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(sql: &str, command: SqlCommandType) -> MappedStatement {
        MappedStatement {
            id: "ns.selectUser".to_string(),
            sql: sql.to_string(),
            command,
        }
    }

    #[test]
    fn parse_placeholders_in_order() {
        let resolved = parse_sql_template(
            "q",
            "SELECT * FROM user WHERE id = #{id} AND name = #{ name , jdbcType=VARCHAR }",
        )
        .unwrap();
        assert_eq!(resolved.sql, "SELECT * FROM user WHERE id = ? AND name = ?");
        assert_eq!(
            resolved.parameter_mappings,
            vec![ParameterMapping::new("id"), ParameterMapping::new("name")]
        );
    }

    #[test]
    fn parse_without_placeholders() {
        let resolved = parse_sql_template("q", "SELECT 1").unwrap();
        assert_eq!(resolved.sql, "SELECT 1");
        assert!(resolved.parameter_mappings.is_empty());
    }

    #[test]
    fn parse_unterminated() {
        let err = parse_sql_template("q", "SELECT #{a} WHERE x = #{b").unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnterminatedPlaceholder {
                id: "q".to_string(),
                offset: 22
            }
        );
    }

    #[test]
    fn parse_empty_placeholder() {
        let err = parse_sql_template("q", "SELECT #{ }").unwrap_err();
        assert!(matches!(err, ResolveError::EmptyPlaceholder { offset: 7, .. }));
    }

    #[test]
    fn template_resolver_requires_select() {
        let invocation = StatementInvocation::new("ns.selectUser", "");
        let update = statement("UPDATE user SET x = #{x}", SqlCommandType::Update);
        let err = TemplateResolver
            .resolve(Some(&update), &invocation)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedCommand { command: "update", .. }));
    }

    #[test]
    fn template_resolver_missing_statement() {
        let invocation = StatementInvocation::new("ns.unknown", "");
        let err = TemplateResolver.resolve(None, &invocation).unwrap_err();
        assert_eq!(err, ResolveError::NoSqlSource("ns.unknown".to_string()));
    }

    #[test]
    fn template_resolver_blank_template() {
        let invocation = StatementInvocation::new("ns.selectUser", "");
        let blank = statement("  ", SqlCommandType::Select);
        assert!(TemplateResolver.resolve(Some(&blank), &invocation).is_err());
    }

    #[test]
    fn placeholder_resolver_always_fails() {
        let invocation = StatementInvocation::new("ns.selectUser", "");
        let select = statement("SELECT 1", SqlCommandType::Select);
        assert!(PlaceholderResolver.resolve(Some(&select), &invocation).is_err());
    }
}
