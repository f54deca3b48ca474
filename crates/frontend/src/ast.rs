use std::fmt::Display;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

// Identity of a variable reference in the tree. The resolver keys its
// annotations on it, so two references to the same name in different places
// never share an id, even across separately parsed REPL lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub nodes: Vec<ASTNode>,
}

impl Program {
    pub fn new(nodes: Vec<ASTNode>) -> Self {
        Self { nodes }
    }

    // Builds a program whose statements all sit on line 0. Handy when the
    // tree is assembled by hand instead of coming out of the parser
    pub fn from_statements(statements: Vec<StatementKind>) -> Self {
        Self {
            nodes: statements.into_iter().map(|s| ASTNode::new(s, 0)).collect(),
        }
    }
}

// Top level statement with the line it starts on
#[derive(Debug, PartialEq, Clone)]
pub struct ASTNode {
    pub stmt: StatementKind,
    pub line: u64,
}

impl ASTNode {
    pub fn new(stmt: StatementKind, line: u64) -> Self {
        Self { stmt, line }
    }
}

// Named place a value is written to: `x = ...` or `x++`
#[derive(Debug, PartialEq, Clone)]
pub struct Variable {
    pub name: String,
    pub id: NodeId,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: NodeId::fresh(),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Param {
    pub name: String,
    // Kept for the type checker, the interpreter never reads it
    pub annotation: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
        }
    }
}

// Shared by named functions, class methods and arrow functions. Behind an Rc
// so the runtime can hold on to a body after the program that declared it is gone.
#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<StatementKind>,
}

impl FunctionDecl {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    Expression(ExpressionKind),
    // x := value
    VarDeclaration {
        name: String,
        value: ExpressionKind,
    },
    // x = value
    VarAssignment {
        target: Variable,
        value: ExpressionKind,
    },
    // x++ or x--
    Update {
        target: Variable,
        operator: UpdateOperator,
    },
    // obj.prop = value
    SetMember {
        object: ExpressionKind,
        property: String,
        value: ExpressionKind,
    },
    Block(Vec<StatementKind>),
    If {
        test: ExpressionKind,
        consequent: Box<StatementKind>,
        alternate: Option<Box<StatementKind>>,
    },
    While {
        test: ExpressionKind,
        body: Box<StatementKind>,
    },
    FnDeclaration(Rc<FunctionDecl>),
    Return {
        value: Option<ExpressionKind>,
    },
    ClassDeclaration {
        name: String,
        methods: Vec<Rc<FunctionDecl>>,
    },
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl BinaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "**" => BinaryOperator::Pow,
            "<" => BinaryOperator::Less,
            ">" => BinaryOperator::Greater,
            "<=" => BinaryOperator::LessEqual,
            ">=" => BinaryOperator::GreaterEqual,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            _ => return None,
        };

        Some(op)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
        };

        write!(f, "{}", symbol)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

impl Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "&&"),
            LogicalOperator::Or => write!(f, "||"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "!"),
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    NumberLiteral {
        value: i64,
    },
    StringLiteral {
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    Identifier {
        symbol: String,
        id: NodeId,
    },
    This {
        id: NodeId,
    },
    BinaryOp {
        left: Box<ExpressionKind>,
        right: Box<ExpressionKind>,
        operator: BinaryOperator,
    },
    // Kept apart from BinaryOp because the right side is evaluated lazily
    Logical {
        left: Box<ExpressionKind>,
        right: Box<ExpressionKind>,
        operator: LogicalOperator,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<ExpressionKind>,
    },
    // Member calls are recursive so in this case: planet.position.y, member
    // is gonna be planet.position and property y
    MemberCall {
        member: Box<ExpressionKind>,
        property: String,
    },
    FunctionCall {
        caller: Box<ExpressionKind>,
        args: Vec<ExpressionKind>,
    },
    // (a, b) => { ... }
    Lambda(Rc<FunctionDecl>),
}

impl ExpressionKind {
    pub fn identifier(symbol: impl Into<String>) -> Self {
        ExpressionKind::Identifier {
            symbol: symbol.into(),
            id: NodeId::fresh(),
        }
    }

    pub fn this() -> Self {
        ExpressionKind::This {
            id: NodeId::fresh(),
        }
    }

    pub fn number(value: i64) -> Self {
        ExpressionKind::NumberLiteral { value }
    }

    pub fn string(value: impl Into<String>) -> Self {
        ExpressionKind::StringLiteral {
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        ExpressionKind::BooleanLiteral { value }
    }

    pub fn binary(left: ExpressionKind, operator: BinaryOperator, right: ExpressionKind) -> Self {
        ExpressionKind::BinaryOp {
            left: Box::new(left),
            right: Box::new(right),
            operator,
        }
    }

    pub fn call(caller: ExpressionKind, args: Vec<ExpressionKind>) -> Self {
        ExpressionKind::FunctionCall {
            caller: Box::new(caller),
            args,
        }
    }

    pub fn member(member: ExpressionKind, property: impl Into<String>) -> Self {
        ExpressionKind::MemberCall {
            member: Box::new(member),
            property: property.into(),
        }
    }
}
