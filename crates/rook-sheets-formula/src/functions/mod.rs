//! Built-in functions
//!
//! Functions receive their argument AST nodes unevaluated, so range-valued
//! arguments can be flattened on demand and conditional functions evaluate
//! only the branch they need.

pub mod date;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod text;

use crate::ast::Expr;
use crate::error::FormulaResult;
use crate::evaluator::{EvalContext, Value};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use rook_sheets_core::CellError;

/// Function implementation signature
pub type FunctionImpl = fn(&[Expr], &mut EvalContext) -> FormulaResult<Value>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

static REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// Dispatch a function call by name
///
/// Unknown names yield `#NAME?`; an argument count outside the declared
/// arity yields `#VALUE!` before any argument is evaluated.
pub(crate) fn call(name: &str, args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Value> {
    let def = match REGISTRY.get(name) {
        Some(def) => def,
        None => {
            log::debug!("unknown function: {}", name);
            return Ok(Value::Error(CellError::Name));
        }
    };

    if args.len() < def.min_args {
        return Ok(Value::Error(CellError::Value));
    }
    if let Some(max) = def.max_args {
        if args.len() > max {
            return Ok(Value::Error(CellError::Value));
        }
    }

    (def.implementation)(args, ctx)
}

/// Evaluate argument nodes into one flat list of scalar values
///
/// Range references expand to every covered cell's resolved value in
/// row-major order; scalar arguments contribute a single entry. Errors stay
/// in place as values for the consumer's propagation policy.
pub(crate) fn flatten_args(args: &[Expr], ctx: &mut EvalContext) -> FormulaResult<Vec<Value>> {
    let mut values = Vec::new();

    for arg in args {
        match arg {
            Expr::RangeRef(range) => {
                for cell in range.cells() {
                    values.push(ctx.resolve_cell(&cell));
                }
            }
            _ => values.push(ctx.eval_expr(arg)?),
        }
    }

    Ok(values)
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_text_functions();
        registry.register_logical_functions();
        registry.register_info_functions();
        registry.register_date_functions();
        registry.register_lookup_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name.to_uppercase().as_str())
    }

    fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: None,
            implementation: math::fn_sum,
        });

        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: None,
            implementation: math::fn_average,
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: None,
            implementation: math::fn_count,
        });

        // COUNTA
        self.register(FunctionDef {
            name: "COUNTA",
            min_args: 1,
            max_args: None,
            implementation: math::fn_counta,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: None,
            implementation: math::fn_min,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: None,
            implementation: math::fn_max,
        });

        // ABS
        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });

        // FLOOR
        self.register(FunctionDef {
            name: "FLOOR",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_floor,
        });

        // CEILING
        self.register(FunctionDef {
            name: "CEILING",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_ceiling,
        });

        // MOD
        self.register(FunctionDef {
            name: "MOD",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_mod,
        });

        // POWER
        self.register(FunctionDef {
            name: "POWER",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_power,
        });

        // SQRT
        self.register(FunctionDef {
            name: "SQRT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sqrt,
        });

        // INT
        self.register(FunctionDef {
            name: "INT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_int,
        });

        // SIGN
        self.register(FunctionDef {
            name: "SIGN",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sign,
        });

        // EXP
        self.register(FunctionDef {
            name: "EXP",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_exp,
        });

        // PI
        self.register(FunctionDef {
            name: "PI",
            min_args: 0,
            max_args: Some(0),
            implementation: math::fn_pi,
        });
    }

    fn register_text_functions(&mut self) {
        // CONCATENATE
        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concatenate,
        });

        // CONCAT (alias)
        self.register(FunctionDef {
            name: "CONCAT",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concatenate,
        });

        // UPPER
        self.register(FunctionDef {
            name: "UPPER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_upper,
        });

        // LOWER
        self.register(FunctionDef {
            name: "LOWER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_lower,
        });

        // LEN
        self.register(FunctionDef {
            name: "LEN",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_len,
        });

        // LEFT
        self.register(FunctionDef {
            name: "LEFT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_left,
        });

        // RIGHT
        self.register(FunctionDef {
            name: "RIGHT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_right,
        });

        // MID
        self.register(FunctionDef {
            name: "MID",
            min_args: 3,
            max_args: Some(3),
            implementation: text::fn_mid,
        });

        // TRIM
        self.register(FunctionDef {
            name: "TRIM",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_trim,
        });

        // SUBSTITUTE
        self.register(FunctionDef {
            name: "SUBSTITUTE",
            min_args: 3,
            max_args: Some(4),
            implementation: text::fn_substitute,
        });

        // TEXT
        self.register(FunctionDef {
            name: "TEXT",
            min_args: 2,
            max_args: Some(2),
            implementation: text::fn_text,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: logical::fn_if,
        });

        // AND
        self.register(FunctionDef {
            name: "AND",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_and,
        });

        // OR
        self.register(FunctionDef {
            name: "OR",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_or,
        });

        // NOT
        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_not,
        });

        // IFERROR
        self.register(FunctionDef {
            name: "IFERROR",
            min_args: 2,
            max_args: Some(2),
            implementation: logical::fn_iferror,
        });
    }

    fn register_info_functions(&mut self) {
        // ISBLANK
        self.register(FunctionDef {
            name: "ISBLANK",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_isblank,
        });

        // ISNUMBER
        self.register(FunctionDef {
            name: "ISNUMBER",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_isnumber,
        });

        // ISTEXT
        self.register(FunctionDef {
            name: "ISTEXT",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_istext,
        });
    }

    fn register_date_functions(&mut self) {
        // TODAY
        self.register(FunctionDef {
            name: "TODAY",
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_today,
        });

        // NOW
        self.register(FunctionDef {
            name: "NOW",
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_now,
        });

        // YEAR
        self.register(FunctionDef {
            name: "YEAR",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_year,
        });

        // MONTH
        self.register(FunctionDef {
            name: "MONTH",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_month,
        });

        // DAY
        self.register(FunctionDef {
            name: "DAY",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_day,
        });
    }

    fn register_lookup_functions(&mut self) {
        // INDEX
        self.register(FunctionDef {
            name: "INDEX",
            min_args: 2,
            max_args: Some(3),
            implementation: lookup::fn_index,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
