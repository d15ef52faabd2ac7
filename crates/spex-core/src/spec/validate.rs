use crate::{
    criterion::{Argument, Criterion},
    model::{Element, ElementRegistry, TypeExpr},
    operation::{Arity, Operation},
    step::Step,
};
use spex_primitives::TypeGroup;
use std::fmt;
use thiserror::Error as ThisError;

///
/// ValidationError
///
/// Every configuration problem found in a spec, collected in one pass.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("spec is invalid ({} issue(s)): {}", .issues.len(), join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    #[must_use]
    pub const fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Whether any issue matches `predicate`.
    pub fn any(&self, predicate: impl Fn(&IssueKind) -> bool) -> bool {
        self.issues.iter().any(|issue| predicate(&issue.kind))
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

///
/// Issue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    pub step: Option<usize>,
    pub kind: IssueKind,
}

impl Issue {
    #[must_use]
    pub const fn new(step: Option<usize>, kind: IssueKind) -> Self {
        Self { step, kind }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "step {step}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

///
/// IssueKind
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IssueKind {
    #[error("a spec must begin with a Query step")]
    MissingQuery,

    #[error("Query may only appear as the first step")]
    MisplacedQuery,

    #[error("no step may follow Verify")]
    AfterVerify,

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("property '{path}' does not exist on {element}")]
    UnknownProperty { path: String, element: String },

    #[error("{operation} on '{path}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        path: String,
        operation: Operation,
        expected: Arity,
        actual: usize,
    },

    #[error("{operation} is not supported for {group} property '{path}'")]
    UnsupportedOperation {
        path: String,
        operation: Operation,
        group: TypeGroup,
    },

    #[error("{operation} on '{path}' requires one nested criterion argument")]
    NestedCriterionRequired { path: String, operation: Operation },

    #[error("invalid argument for '{path}': {message}")]
    InvalidArgument { path: String, message: String },
}

/// Pipeline-order and per-step checks, accumulating every issue.
pub(crate) fn validate_steps(element: &str, steps: &[Step], registry: &ElementRegistry) -> Vec<Issue> {
    let mut issues = Vec::new();

    if !matches!(steps.first(), Some(Step::Query { .. })) {
        issues.push(Issue::new(None, IssueKind::MissingQuery));
    }
    for (index, step) in steps.iter().enumerate().skip(1) {
        if matches!(step, Step::Query { .. }) {
            issues.push(Issue::new(Some(index), IssueKind::MisplacedQuery));
        }
        if steps[index - 1].is_terminal() {
            issues.push(Issue::new(Some(index), IssueKind::AfterVerify));
        }
    }

    let root = TypeExpr::named(element);
    if registry.element(&root).is_err() {
        issues.push(Issue::new(None, IssueKind::UnknownElement(element.to_string())));
        return issues;
    }

    // thread the shape through the pipeline; stop once it is unknown
    let mut shape = root;
    for (index, step) in steps.iter().enumerate() {
        match step.check(Some(index), &shape, registry, &mut issues) {
            Some(next) => shape = next,
            None => break,
        }
    }

    issues
}

/// Check criteria against the element they will be evaluated on.
pub(crate) fn check_criteria(
    criteria: &[Criterion],
    element: &Element,
    registry: &ElementRegistry,
    step: Option<usize>,
    issues: &mut Vec<Issue>,
) {
    for criterion in criteria {
        check_criterion(criterion, element, registry, step, issues);
    }
}

fn check_criterion(
    criterion: &Criterion,
    element: &Element,
    registry: &ElementRegistry,
    step: Option<usize>,
    issues: &mut Vec<Issue>,
) {
    let path = criterion.property.clone();
    let op = criterion.operation;

    let Some(property) = element.property(&path) else {
        issues.push(Issue::new(
            step,
            IssueKind::UnknownProperty {
                path,
                element: element.name(),
            },
        ));
        return;
    };

    if !op.arity().accepts(criterion.arguments.len()) {
        issues.push(Issue::new(
            step,
            IssueKind::ArgumentCount {
                path: path.clone(),
                operation: op,
                expected: op.arity(),
                actual: criterion.arguments.len(),
            },
        ));
    }
    if !op.supports(property.group()) {
        issues.push(Issue::new(
            step,
            IssueKind::UnsupportedOperation {
                path: path.clone(),
                operation: op,
                group: property.group(),
            },
        ));
    }

    if op.is_quantifier() {
        let nested = match criterion.arguments.as_slice() {
            [Argument::Criterion(nested)] => nested,
            _ => {
                issues.push(Issue::new(
                    step,
                    IssueKind::NestedCriterionRequired {
                        path,
                        operation: op,
                    },
                ));
                return;
            }
        };

        // nested criteria run against each member of the collection
        if let Some(item) = property.ty().item() {
            match registry.element(item) {
                Ok(item_element) => check_criterion(nested, &item_element, registry, step, issues),
                Err(_) => issues.push(Issue::new(step, IssueKind::UnknownElement(item.to_string()))),
            }
        }
        return;
    }

    if registry.config().evaluation.coerce_text_arguments {
        for argument in &criterion.arguments {
            if let Argument::Literal(value) = argument
                && let Err(message) = crate::criterion::coerce(value.clone(), property)
            {
                issues.push(Issue::new(
                    step,
                    IssueKind::InvalidArgument {
                        path: path.clone(),
                        message,
                    },
                ));
            }
        }
    }
}
