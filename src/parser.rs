//! Parser for `.tmc` decision programs, built on `pest`. The grammar lives
//! in `grammar.pest`; this module walks the parse tree into an
//! [`ast::Program`].

use std::collections::BTreeSet;

use pest::iterators::{Pair, Pairs};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;

use crate::ast::{BinOp, Expr, Program, Stmt};
use crate::types::{Direction, Symbol, TurcError, BLANK};

/// Derives a `PestParser` for the grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TmcParser;

/// Parses a `.tmc` source string into a [`Program`].
///
/// This is the crate's parsing entry point. Syntax errors come back as
/// [`TurcError::Parse`] carrying the offending span; anything that parses is
/// structurally a valid program (semantic restrictions such as assignment
/// shapes are enforced during lowering).
pub fn parse(source: &str) -> Result<Program, TurcError> {
    let root = TmcParser::parse(Rule::program, source.trim())
        .map_err(|e| TurcError::Parse(e.into()))?
        .next()
        .unwrap();

    parse_program(root)
}

fn parse_program(pair: Pair<Rule>) -> Result<Program, TurcError> {
    let mut program = Program::default();
    // Names already bound; the first binding of a name declares it, later
    // bindings assign to it.
    let mut declared = BTreeSet::new();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::alphabet_decl => {
                program.input_alphabet.extend(parse_symbol_list_in(p));
            }
            Rule::markers_decl => {
                program.markers.extend(parse_symbol_list_in(p));
            }
            Rule::stmt => program.body.push(parse_stmt(p, &mut declared)?),
            _ => {} // keywords, EOI
        }
    }

    Ok(program)
}

fn parse_stmt(pair: Pair<Rule>, declared: &mut BTreeSet<String>) -> Result<Stmt, TurcError> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::return_stmt => {
            let expr = parse_expr(inner.into_inner().nth(1).unwrap());
            Ok(Stmt::Return(expr))
        }
        Rule::accept_stmt => Ok(Stmt::Accept),
        Rule::reject_stmt => Ok(Stmt::Reject),
        Rule::break_stmt => Ok(Stmt::Break),
        Rule::for_stmt => parse_for(inner, declared),
        Rule::loop_stmt => {
            let block = find_rule(inner.into_inner(), Rule::block);
            Ok(Stmt::Loop(parse_block(block, declared)?))
        }
        Rule::scan_stmt => Ok(parse_scan(inner)),
        Rule::write_stmt => {
            let sym = find_rule(inner.into_inner(), Rule::symbol);
            Ok(Stmt::Write(parse_symbol(sym.as_str())))
        }
        Rule::move_stmt => {
            let dir = match inner.into_inner().next().unwrap().as_rule() {
                Rule::kw_left => Direction::Left,
                _ => Direction::Right,
            };
            Ok(Stmt::Move(dir))
        }
        Rule::inc_stmt => {
            let name = find_rule(inner.into_inner(), Rule::ident);
            Ok(Stmt::Inc(name.as_str().to_string()))
        }
        Rule::append_stmt => {
            let mut names = inner
                .into_inner()
                .filter(|p| p.as_rule() == Rule::ident)
                .map(|p| p.as_str().to_string());
            let src = names.next().unwrap();
            let dst = names.next().unwrap();
            Ok(Stmt::Append { src, dst })
        }
        Rule::if_stmt => parse_if(inner, declared),
        Rule::bind_stmt => parse_bind(inner, declared),
        rule => unreachable!("unexpected statement rule {:?}", rule),
    }
}

fn parse_bind(pair: Pair<Rule>, declared: &mut BTreeSet<String>) -> Result<Stmt, TurcError> {
    let mut pairs = pair.into_inner();
    let name = pairs.next().unwrap().as_str().to_string();
    let expr = parse_expr(pairs.next().unwrap());

    if declared.contains(&name) {
        Ok(Stmt::Assign { name, value: expr })
    } else {
        declared.insert(name.clone());
        Ok(Stmt::Let { name, init: expr })
    }
}

fn parse_for(pair: Pair<Rule>, declared: &mut BTreeSet<String>) -> Result<Stmt, TurcError> {
    let mut var = String::new();
    let mut exprs = Vec::new();
    let mut body = Vec::new();

    // The loop variable is in scope inside the body (and stays declared
    // afterwards, like every other region-backed variable).
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ident => {
                var = p.as_str().to_string();
                declared.insert(var.clone());
            }
            Rule::expr => exprs.push(parse_expr(p)),
            Rule::block => body = parse_block(p, declared)?,
            _ => {}
        }
    }

    let end = exprs.pop().unwrap();
    let start = exprs.pop().unwrap();
    Ok(Stmt::For {
        var,
        start,
        end,
        body,
    })
}

fn parse_if(pair: Pair<Rule>, declared: &mut BTreeSet<String>) -> Result<Stmt, TurcError> {
    let form = pair
        .into_inner()
        .find(|p| matches!(p.as_rule(), Rule::if_cond | Rule::if_current))
        .unwrap();

    match form.as_rule() {
        Rule::if_cond => {
            let mut operands = Vec::new();
            let mut then_body = Vec::new();
            let mut else_body = Vec::new();
            for p in form.into_inner() {
                match p.as_rule() {
                    Rule::operand => operands.push(parse_operand(p)),
                    Rule::block => then_body = parse_block(p, declared)?,
                    Rule::else_block => {
                        let block = find_rule(p.into_inner(), Rule::block);
                        else_body = parse_block(block, declared)?;
                    }
                    _ => {}
                }
            }
            let rhs = operands.pop().unwrap();
            let lhs = operands.pop().unwrap();
            Ok(Stmt::If {
                cond: Expr::Bin {
                    op: BinOp::Eq,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                then_body,
                else_body,
            })
        }
        Rule::if_current => {
            let mut branches: Vec<(Symbol, Vec<Stmt>)> = Vec::new();
            let mut else_body = Vec::new();
            let mut pending: Option<Symbol> = None;
            for p in form.into_inner() {
                match p.as_rule() {
                    Rule::symbol => pending = Some(parse_symbol(p.as_str())),
                    Rule::block => {
                        branches.push((pending.take().unwrap(), parse_block(p, declared)?));
                    }
                    Rule::else_if => {
                        let mut sym = BLANK;
                        let mut body = Vec::new();
                        for q in p.into_inner() {
                            match q.as_rule() {
                                Rule::symbol => sym = parse_symbol(q.as_str()),
                                Rule::block => body = parse_block(q, declared)?,
                                _ => {}
                            }
                        }
                        branches.push((sym, body));
                    }
                    Rule::else_block => {
                        let block = find_rule(p.into_inner(), Rule::block);
                        else_body = parse_block(block, declared)?;
                    }
                    _ => {}
                }
            }
            Ok(Stmt::IfCurrent {
                branches,
                else_body,
            })
        }
        _ => unreachable!(),
    }
}

fn parse_scan(pair: Pair<Rule>) -> Stmt {
    let mut dir = Direction::Right;
    let mut stop = BTreeSet::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::scan_dir => {
                dir = match p.into_inner().next().unwrap().as_rule() {
                    Rule::kw_left => Direction::Left,
                    _ => Direction::Right,
                };
            }
            Rule::stop_set => {
                let set = p.into_inner().next().unwrap();
                match set.as_rule() {
                    Rule::symbol_list => stop.extend(parse_symbol_list(set)),
                    Rule::symbol => {
                        stop.insert(parse_symbol(set.as_str()));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
    Stmt::Scan { dir, stop }
}

fn parse_block(pair: Pair<Rule>, declared: &mut BTreeSet<String>) -> Result<Vec<Stmt>, TurcError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::stmt)
        .map(|p| parse_stmt(p, declared))
        .collect()
}

fn parse_expr(pair: Pair<Rule>) -> Expr {
    // expr = add_expr (cmp_op add_expr)?
    let mut pairs = pair.into_inner();
    let lhs = parse_add_expr(pairs.next().unwrap());
    match pairs.next() {
        Some(op_pair) => {
            let op = match op_pair.as_str() {
                "==" => BinOp::Eq,
                "!=" => BinOp::Ne,
                "<" => BinOp::Lt,
                "<=" => BinOp::Le,
                ">" => BinOp::Gt,
                _ => BinOp::Ge,
            };
            let rhs = parse_add_expr(pairs.next().unwrap());
            Expr::Bin {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }
        }
        None => lhs,
    }
}

fn parse_add_expr(pair: Pair<Rule>) -> Expr {
    // add_expr = term (add_op term)*, folded left-associatively.
    let mut pairs = pair.into_inner();
    let mut lhs = parse_term(pairs.next().unwrap());
    while let Some(op_pair) = pairs.next() {
        let op = if op_pair.as_str() == "+" {
            BinOp::Add
        } else {
            BinOp::Sub
        };
        let rhs = parse_term(pairs.next().unwrap());
        lhs = Expr::Bin {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
    lhs
}

fn parse_term(pair: Pair<Rule>) -> Expr {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::int => Expr::Int(inner.as_str().parse().unwrap_or(0)),
        Rule::count_expr => parse_count(inner),
        Rule::ident => Expr::Var(inner.as_str().to_string()),
        Rule::expr => parse_expr(inner),
        rule => unreachable!("unexpected term rule {:?}", rule),
    }
}

fn parse_operand(pair: Pair<Rule>) -> Expr {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::int => Expr::Int(inner.as_str().parse().unwrap_or(0)),
        Rule::count_expr => parse_count(inner),
        Rule::ident => Expr::Var(inner.as_str().to_string()),
        rule => unreachable!("unexpected operand rule {:?}", rule),
    }
}

fn parse_count(pair: Pair<Rule>) -> Expr {
    let sym = find_rule(pair.into_inner(), Rule::symbol);
    Expr::Count(parse_symbol(sym.as_str()))
}

/// Maps a source symbol to its tape symbol; `_` denotes the blank.
fn parse_symbol(text: &str) -> Symbol {
    match text.chars().next().unwrap_or(BLANK) {
        '_' => BLANK,
        c => c,
    }
}

fn parse_symbol_list(pair: Pair<Rule>) -> Vec<Symbol> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| parse_symbol(p.as_str()))
        .collect()
}

/// Symbols of the `symbol_list` nested somewhere inside `pair`.
fn parse_symbol_list_in(pair: Pair<Rule>) -> Vec<Symbol> {
    parse_symbol_list(find_rule(pair.into_inner(), Rule::symbol_list))
}

fn find_rule<'a>(mut pairs: Pairs<'a, Rule>, rule: Rule) -> Pair<'a, Rule> {
    pairs.find(|p| p.as_rule() == rule).unwrap()
}
