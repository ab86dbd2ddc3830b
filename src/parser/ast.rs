use std::fmt;

/// A parsed program: the ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Let {
        name: String,
        mutable: bool,
        ty: Option<Type>,
        value: Option<Expression>,
    },
    Const {
        name: String,
        ty: Option<Type>,
        value: Expression,
    },
    Return(Option<Expression>),
    Expression(Expression),
    Block(Vec<Statement>),
    While {
        condition: Expression,
        body: Box<Statement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    FunctionLiteral {
        parameters: Vec<Parameter>,
        return_type: Option<Type>,
        body: Vec<Statement>,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    },
    Block(Vec<Statement>),
    Pipe {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Reserved. The parser recognizes `match` and rejects it; no cases
    /// are ever built.
    Match {
        scrutinee: Box<Expression>,
        cases: Vec<MatchCase>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// A parsed type annotation, distinct from the semantic layer's
/// [`crate::semantic::TypeInfo`].
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Named(String),
    Function {
        parameters: Vec<Type>,
        return_type: Box<Type>,
    },
    /// Reserved. User-defined struct types are not part of the surface
    /// language yet.
    Struct {
        field_names: Vec<String>,
        field_types: Vec<Type>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Minus,
    Not,
    Ref,
    MutRef,
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Assign,
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            PrefixOperator::Minus => "-",
            PrefixOperator::Not => "!",
            PrefixOperator::Ref => "&",
            PrefixOperator::MutRef => "&mut",
            PrefixOperator::Deref => "*",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Modulo => "%",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::Less => "<",
            InfixOperator::Greater => ">",
            InfixOperator::LessEqual => "<=",
            InfixOperator::GreaterEqual => ">=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
            InfixOperator::Assign => "=",
        };
        write!(f, "{}", symbol)
    }
}
