//! CPLEX LP text export.

use super::backend::{Direction, VarKind};
use super::model::{LinearExpr, LpModel, Variable};
use std::io::{self, Write};

impl LpModel {
    /// Writes the model in CPLEX LP format.
    ///
    /// Variable and constraint names are written as given, so they must be
    /// valid LP identifiers. Expression constants are moved to the
    /// right-hand side of their constraint. A model without an objective is
    /// written with an empty minimization.
    pub fn write_lp<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\\ Model: {}", self.name)?;
        match self.objective() {
            Some(obj) => {
                writeln!(out, "{}", direction_keyword(obj.direction))?;
                writeln!(out, " obj: {}", format_expr(self, &obj.expr, true))?;
            }
            None => {
                writeln!(out, "Minimize")?;
                writeln!(out, " obj: 0")?;
            }
        }

        writeln!(out, "Subject To")?;
        for c in self.constraints() {
            writeln!(
                out,
                " {}: {} {} {}",
                c.name,
                format_expr(self, &c.expr, false),
                c.sense,
                format_num(c.rhs - c.expr.constant())
            )?;
        }

        writeln!(out, "Bounds")?;
        for var in self.variables() {
            if let Some(line) = bounds_line(var) {
                writeln!(out, " {line}")?;
            }
        }

        let generals: Vec<&str> = self
            .variables()
            .iter()
            .filter(|v| v.kind == VarKind::Integer && !v.is_binary())
            .map(|v| v.name.as_str())
            .collect();
        if !generals.is_empty() {
            writeln!(out, "Generals")?;
            for name in generals {
                writeln!(out, " {name}")?;
            }
        }

        let binaries: Vec<&str> = self
            .variables()
            .iter()
            .filter(|v| v.is_binary())
            .map(|v| v.name.as_str())
            .collect();
        if !binaries.is_empty() {
            writeln!(out, "Binaries")?;
            for name in binaries {
                writeln!(out, " {name}")?;
            }
        }

        writeln!(out, "End")
    }

    /// The LP text as a `String`.
    pub fn to_lp_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_lp(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn direction_keyword(direction: Direction) -> &'static str {
    match direction {
        Direction::Minimize => "Minimize",
        Direction::Maximize => "Maximize",
    }
}

// LP defaults are [0, +inf); only deviations are written.
fn bounds_line(var: &Variable) -> Option<String> {
    if var.is_binary() {
        return None;
    }
    let lower_default = var.lower == 0.0;
    let upper_default = var.upper == f64::INFINITY;
    match (lower_default, upper_default) {
        (true, true) => None,
        (true, false) => Some(format!("{} <= {}", var.name, format_num(var.upper))),
        (false, true) => Some(format!("{} >= {}", var.name, format_bound(var.lower))),
        (false, false) => Some(format!(
            "{} <= {} <= {}",
            format_bound(var.lower),
            var.name,
            format_num(var.upper)
        )),
    }
}

fn format_bound(v: f64) -> String {
    if v == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format_num(v)
    }
}

// Integral values below 1e15 are exact as i64.
fn format_num(v: f64) -> String {
    if v.abs() < 1e15 && (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v}")
    }
}

fn format_expr(model: &LpModel, expr: &LinearExpr, with_constant: bool) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(expr.terms().len() + 1);
    for &(var, coef) in expr.terms() {
        let name = model
            .variable(var)
            .map_or("?", |v| v.name.as_str());
        let sign = if coef < 0.0 { "-" } else { "+" };
        let magnitude = coef.abs();
        if (magnitude - 1.0).abs() < 1e-12 {
            parts.push(format!("{sign} {name}"));
        } else {
            parts.push(format!("{sign} {} {name}", format_num(magnitude)));
        }
    }
    if with_constant && expr.constant() != 0.0 {
        let sign = if expr.constant() < 0.0 { "-" } else { "+" };
        parts.push(format!("{sign} {}", format_num(expr.constant().abs())));
    }
    if parts.is_empty() {
        return "0".to_string();
    }
    parts.join(" ")
}
