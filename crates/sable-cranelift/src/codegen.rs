//! Code generation from the Sable AST to Cranelift IR
//!
//! One [`CodeGenerator`] lowers one AST module into one Cranelift module.
//! Functions are lowered in source order, each with its own
//! `FunctionLowerer`; top-level statements go into a synthesized entry
//! function. Every lowered expression is recorded in a [`ValueCache`] keyed
//! by node identity and reused if the node is reached again.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use cranelift_codegen::ir::{Block, FuncRef, Function, InstBuilder, UserFuncName, Value};
use cranelift_codegen::isa::TargetIsa;
use cranelift_codegen::print_errors::pretty_verifier_error;
use cranelift_codegen::verify_function;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_module::{FuncId, FuncOrDataId, Linkage, Module};
use sable_ast::{
    ArgumentValue, AstNode, BinaryOp, BinaryOperation, Declaration, Expression, FunctionCall,
    FunctionDecl, Literal, Module as AstModule, NodeId, Reference, Slot, Statement,
    StatementKeyword, StructuralError, declaring_scope, fold, is_static_constant, resolve,
};
use target_lexicon::Triple;
use tracing::{debug, trace};

use crate::cache::ValueCache;
use crate::config::BuildConfig;
use crate::errors::{BoxError, CompilationError, CompilationResult, SemanticError};
use crate::report::Deferred;
use crate::runtime::RuntimeFunctions;
use crate::types::SableTypes;

/// Handle to the synthesized program entry function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFunction {
    pub id: FuncId,
    pub symbol: String,
}

/// A function as it was handed to the module, before any backend passes.
#[derive(Clone, Debug)]
pub struct LoweredFunction {
    pub id: FuncId,
    pub name: String,
    pub params: Vec<String>,
    pub func: Function,
}

/// Everything one lowering pass produced.
#[derive(Clone, Debug)]
pub struct LoweredModule {
    pub name: String,
    pub entry: EntryFunction,
    /// Defined functions, in definition order.
    pub functions: Vec<LoweredFunction>,
    pub cache_hits: usize,
}

impl LoweredModule {
    pub fn function(&self, name: &str) -> Option<&LoweredFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Render the module as CLIF text: a comment header naming the module,
    /// target and symbols, then every function in definition order.
    pub fn render(&self, target: &Triple) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "; module {}", self.name);
        let _ = writeln!(out, "; target {target}");
        for symbol in RuntimeFunctions::symbols() {
            let _ = writeln!(out, "; import {symbol}");
        }
        for function in &self.functions {
            if function.id == self.entry.id {
                let _ = writeln!(out, "; export {}", function.name);
            } else {
                let _ = writeln!(
                    out,
                    "; local {}({})",
                    function.name,
                    function.params.join(", ")
                );
            }
        }
        for function in &self.functions {
            let _ = write!(out, "\n{}", function.func.display());
        }
        out
    }
}

/// Code generator for Sable → Cranelift IR
pub struct CodeGenerator<'m, M: Module> {
    module: &'m mut M,
    runtime: &'m RuntimeFunctions,
    config: &'m BuildConfig,
    cache: ValueCache,
    defined: HashSet<FuncId>,
    /// Scope each local function symbol was declared in.
    scopes: HashMap<FuncId, NodeId>,
    functions: Vec<LoweredFunction>,
}

impl<'m, M: Module> CodeGenerator<'m, M> {
    pub fn new(module: &'m mut M, runtime: &'m RuntimeFunctions, config: &'m BuildConfig) -> Self {
        Self {
            module,
            runtime,
            config,
            cache: ValueCache::default(),
            defined: HashSet::new(),
            scopes: HashMap::new(),
            functions: Vec::new(),
        }
    }

    /// Lower a whole module: synthesize the entry function, lower every
    /// top-level slot into it in order, then verify the module.
    pub fn lower_module(&mut self, ast: &AstModule) -> CompilationResult<LoweredModule> {
        let symbol = self.config.entry_symbol.clone();
        let mut sig = self.module.make_signature();
        sig.returns.push(SableTypes::int_param());
        let entry_id = self
            .module
            .declare_function(&symbol, Linkage::Export, &sig)
            .box_err()?;

        let mut ctx = self.module.make_context();
        ctx.func.signature = sig;
        ctx.func.name = UserFuncName::testcase(&symbol);
        let mut func_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut ctx.func, &mut func_ctx);
        let block = builder.create_block();
        builder.switch_to_block(block);
        builder.seal_block(block);

        let mut lowerer = FunctionLowerer::new(self, builder, block, ast.id());
        lowerer.lower_body(&ast.body)?;
        if !lowerer.terminated {
            let zero = lowerer.builder.ins().iconst(SableTypes::int(), 0);
            lowerer.builder.ins().return_(&[zero]);
            lowerer.terminated = true;
        }
        lowerer.finish(&symbol)?;

        self.define(entry_id, &symbol, Vec::new(), ctx)?;
        self.verify_module()?;

        Ok(LoweredModule {
            name: ast.name.clone(),
            entry: EntryFunction {
                id: entry_id,
                symbol,
            },
            functions: std::mem::take(&mut self.functions),
            cache_hits: self.cache.hits(),
        })
    }

    /// Lower a function declaration, or return the function it was already
    /// lowered to.
    pub fn lower_function_decl(&mut self, func: &FunctionDecl) -> CompilationResult<FuncId> {
        if let Some((id, _)) = self.cache.function(func.id()) {
            return Ok(id);
        }
        if func.name.data().is_placeholder() {
            return Err(SemanticError::IncompleteSyntax {
                span: func.name.span(),
            }
            .into());
        }
        let name = func.name();
        let scope = declaring_scope(func)?.node().id();
        let mut symbol = name.to_string();
        if let Some(existing) = self.module.get_name(name) {
            // A local function of the same name in the same scope is reused
            // as is. The entry and runtime symbols cannot be redefined from
            // source.
            match existing {
                FuncOrDataId::Func(id)
                    if self.module.declarations().get_function_decl(id).linkage
                        == Linkage::Local =>
                {
                    if self.scopes.get(&id) == Some(&scope) {
                        debug!(function = name, "reusing existing declaration");
                        self.cache.insert_function(func.id(), id, Vec::new());
                        return Ok(id);
                    }
                    // Shadowing declaration in another scope.
                    symbol = format!("{name}.{}", func.id().raw());
                }
                _ => {
                    return Err(SemanticError::DuplicateFunction {
                        name: name.to_string(),
                        span: func.name.span(),
                    }
                    .into());
                }
            }
        }
        debug!(function = %symbol, params = func.params.len(), "lowering function");

        // Every parameter and the return value are integers, whatever the
        // annotations say.
        let mut sig = self.module.make_signature();
        sig.params
            .extend(func.params.iter().map(|_| SableTypes::int_param()));
        sig.returns.push(SableTypes::int_param());
        let id = self
            .module
            .declare_function(&symbol, Linkage::Local, &sig)
            .box_err()?;
        self.scopes.insert(id, scope);

        let mut ctx = self.module.make_context();
        ctx.func.signature = sig;
        ctx.func.name = UserFuncName::testcase(&symbol);
        let mut func_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut ctx.func, &mut func_ctx);
        let block = builder.create_block();
        builder.append_block_params_for_function_params(block);
        builder.switch_to_block(block);
        builder.seal_block(block);
        let params = builder.block_params(block).to_vec();
        self.cache.insert_function(func.id(), id, params);

        let mut lowerer = FunctionLowerer::new(self, builder, block, func.id());
        lowerer.lower_body(&func.body)?;
        lowerer.finish(&symbol)?;

        let param_names = func.params.iter().map(|p| p.name().to_string()).collect();
        self.define(id, &symbol, param_names, ctx)?;
        Ok(id)
    }

    fn define(
        &mut self,
        id: FuncId,
        name: &str,
        params: Vec<String>,
        mut ctx: cranelift_codegen::Context,
    ) -> CompilationResult<()> {
        verify(&ctx.func, self.module.isa(), name)?;
        let func = ctx.func.clone();
        self.module.define_function(id, &mut ctx).box_err()?;
        self.module.clear_context(&mut ctx);
        self.defined.insert(id);
        self.functions.push(LoweredFunction {
            id,
            name: name.to_string(),
            params,
            func,
        });
        debug!(function = name, "function defined");
        Ok(())
    }

    /// Every non-import declaration must be defined, and every defined
    /// function must pass the verifier.
    fn verify_module(&self) -> CompilationResult<()> {
        let declarations = self.module.declarations();
        for (id, decl) in declarations.get_functions() {
            if decl.linkage == Linkage::Import || self.defined.contains(&id) {
                continue;
            }
            let name = decl.linkage_name(id).into_owned();
            return Err(CompilationError::verification(
                format!("function `{name}` is declared but never defined"),
                None,
            ));
        }
        for function in &self.functions {
            verify(&function.func, self.module.isa(), &function.name)?;
        }
        debug!(functions = self.functions.len(), "module verified");
        Ok(())
    }
}

fn verify(func: &Function, isa: &dyn TargetIsa, name: &str) -> CompilationResult<()> {
    if let Err(errors) = verify_function(func, isa) {
        let message = format!(
            "function `{name}` has {} verifier error(s): {errors}",
            errors.0.len()
        );
        let func = func.clone();
        let details = Deferred::new(move || pretty_verifier_error(&func, None, errors.clone()));
        return Err(CompilationError::verification(message, Some(details)));
    }
    Ok(())
}

/// Per-function lowering context
struct FunctionLowerer<'g, 'm, 'b, M: Module> {
    codegen: &'g mut CodeGenerator<'m, M>,
    builder: FunctionBuilder<'b>,
    block: Block,
    /// The function (or module, for the entry) whose body is being lowered.
    owner: NodeId,
    terminated: bool,
    callees: HashMap<FuncId, FuncRef>,
}

impl<'g, 'm, 'b, M: Module> FunctionLowerer<'g, 'm, 'b, M> {
    fn new(
        codegen: &'g mut CodeGenerator<'m, M>,
        builder: FunctionBuilder<'b>,
        block: Block,
        owner: NodeId,
    ) -> Self {
        Self {
            codegen,
            builder,
            block,
            owner,
            terminated: false,
            callees: HashMap::new(),
        }
    }

    fn lower_body(&mut self, body: &[Slot]) -> CompilationResult<()> {
        for slot in body {
            match slot {
                Slot::Declaration(Declaration::Function(func)) => {
                    self.codegen.lower_function_decl(func)?;
                }
                Slot::Declaration(Declaration::Parameter(param)) => {
                    return Err(StructuralError::UnexpectedSyntax {
                        expected: "Slot",
                        found: format!("Parameter `{}`", param.name()),
                    }
                    .into());
                }
                Slot::Statement(stmt) => {
                    if self.terminated && (stmt.keyword.is_some() || stmt.expr.is_some()) {
                        return Err(SemanticError::UnreachableStatement { span: stmt.span() }.into());
                    }
                    self.lower_statement(stmt)?;
                    self.restore_cursor()?;
                }
            }
        }
        Ok(())
    }

    /// Lowering stays in the single entry block; a statement must leave the
    /// insertion point there.
    fn restore_cursor(&mut self) -> CompilationResult<()> {
        match self.builder.current_block() {
            Some(block) if block == self.block => Ok(()),
            _ => Err(CompilationError::verification(
                "statement lowering left the entry block",
                None,
            )),
        }
    }

    fn finish(self, name: &str) -> CompilationResult<()> {
        if !self.terminated {
            let func = self.builder.func.clone();
            return Err(CompilationError::verification(
                format!("function `{name}` does not end with `return`"),
                Some(Deferred::new(move || func.display().to_string())),
            ));
        }
        self.builder.finalize();
        Ok(())
    }

    fn lower_statement(&mut self, stmt: &Statement) -> CompilationResult<()> {
        let value = match &stmt.expr {
            Some(expr) => Some(self.lower_expression(expr)?),
            None => None,
        };
        match stmt.keyword {
            None => {}
            Some(StatementKeyword::Out) => {
                let Some(expr) = &stmt.expr else {
                    return Err(SemanticError::UnsupportedFormat { span: stmt.span() }.into());
                };
                // Second path to the same node: answered by the cache.
                let arg = self.lower_expression(expr)?;
                if self.builder.func.dfg.value_type(arg) != SableTypes::int() {
                    return Err(SemanticError::UnsupportedFormat {
                        span: expr.data().span(),
                    }
                    .into());
                }
                let out_int = self.func_ref(self.codegen.runtime.out_int);
                self.builder.ins().call(out_int, &[arg]);
            }
            Some(StatementKeyword::Return) => {
                match value {
                    Some(value) => self.builder.ins().return_(&[value]),
                    None => self.builder.ins().return_(&[]),
                };
                self.terminated = true;
            }
        }
        Ok(())
    }

    fn lower_expression(&mut self, expr: &Expression) -> CompilationResult<Value> {
        let data = expr.data();
        if let Some(value) = self.codegen.cache.value(data.id()) {
            return Ok(value);
        }
        if data.is_placeholder() {
            return Err(SemanticError::IncompleteSyntax { span: data.span() }.into());
        }
        let value = match expr {
            Expression::Literal(lit) => self.lower_literal(lit)?,
            Expression::Binary(bin) => self.lower_binary(expr, bin)?,
            Expression::Call(call) => self.lower_call(call)?,
            Expression::Reference(reference) => self.lower_reference(reference)?,
        };
        self.codegen.cache.insert_value(data.id(), value);
        Ok(value)
    }

    fn lower_literal(&mut self, lit: &Literal) -> CompilationResult<Value> {
        let value = lit.value()?;
        Ok(self.builder.ins().iconst(SableTypes::int(), value))
    }

    fn lower_binary(
        &mut self,
        expr: &Expression,
        bin: &BinaryOperation,
    ) -> CompilationResult<Value> {
        if self.codegen.config.fold_constants
            && is_static_constant(expr)?
            && let Some(value) = fold(expr)
        {
            trace!(node = %bin.id(), value, "folded");
            return Ok(self.builder.ins().iconst(SableTypes::int(), value));
        }

        let lhs = self.lower_expression(&bin.left)?;
        let rhs = self.lower_expression(&bin.right)?;
        let value = match bin.op.op {
            BinaryOp::Add => self.builder.ins().iadd(lhs, rhs),
            BinaryOp::Sub => self.builder.ins().isub(lhs, rhs),
            BinaryOp::Mul => self.builder.ins().imul(lhs, rhs),
            BinaryOp::Div => {
                if fold(&bin.right) == Some(0) {
                    return Err(SemanticError::DivisionByZero { span: bin.span() }.into());
                }
                self.builder.ins().sdiv(lhs, rhs)
            }
        };
        Ok(value)
    }

    fn lower_call(&mut self, call: &FunctionCall) -> CompilationResult<Value> {
        let name = call.callee.name();
        let decl = match resolve(&call.callee)? {
            Some(Declaration::Function(decl)) => decl,
            Some(Declaration::Parameter(_)) => {
                return Err(SemanticError::NotAValue {
                    name: name.to_string(),
                    span: call.callee.span(),
                }
                .into());
            }
            None => {
                return Err(SemanticError::UnresolvedReference {
                    name: name.to_string(),
                    span: call.callee.span(),
                }
                .into());
            }
        };

        // Callees must be lowered before the call.
        let id = match self.codegen.cache.function(decl.id()) {
            Some((id, _)) => id,
            None => {
                return Err(SemanticError::CalleeNotFound {
                    name: name.to_string(),
                    span: call.callee.span(),
                }
                .into());
            }
        };
        let expected = self
            .codegen
            .module
            .declarations()
            .get_function_decl(id)
            .signature
            .params
            .len();
        if expected != call.args.len() {
            return Err(SemanticError::ArityMismatch {
                name: name.to_string(),
                expected,
                found: call.args.len(),
                span: call.span(),
            }
            .into());
        }

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.lower_argument(&arg.value)?);
        }
        let callee = self.func_ref(id);
        let inst = self.builder.ins().call(callee, &args);
        self.builder
            .inst_results(inst)
            .first()
            .copied()
            .ok_or_else(|| {
                SemanticError::NotAValue {
                    name: name.to_string(),
                    span: call.span(),
                }
                .into()
            })
    }

    fn lower_argument(&mut self, value: &ArgumentValue) -> CompilationResult<Value> {
        self.lower_expression(&value.to_expression())
    }

    fn lower_reference(&mut self, reference: &Reference) -> CompilationResult<Value> {
        let name = reference.name();
        let param = match resolve(reference)? {
            Some(Declaration::Parameter(param)) => param,
            Some(Declaration::Function(_)) => {
                return Err(SemanticError::NotAValue {
                    name: name.to_string(),
                    span: reference.span(),
                }
                .into());
            }
            None => {
                return Err(SemanticError::UnresolvedReference {
                    name: name.to_string(),
                    span: reference.span(),
                }
                .into());
            }
        };

        let owner = param.owner()?;
        let captured = || SemanticError::CapturedParameter {
            name: name.to_string(),
            span: reference.span(),
        };
        if owner.id() != self.owner {
            return Err(captured().into());
        }
        let position = owner
            .param_position(&param)
            .ok_or(StructuralError::MissingParent {
                kind: "Parameter",
                span: param.span(),
            })?;
        let (_, params) = self.codegen.cache.function(owner.id()).ok_or_else(captured)?;
        params.get(position).copied().ok_or_else(|| captured().into())
    }

    fn func_ref(&mut self, id: FuncId) -> FuncRef {
        if let Some(func_ref) = self.callees.get(&id) {
            return *func_ref;
        }
        let func_ref = self
            .codegen
            .module
            .declare_func_in_func(id, self.builder.func);
        self.callees.insert(id, func_ref);
        func_ref
    }
}
