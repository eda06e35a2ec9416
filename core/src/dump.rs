//! Human-readable IR dump.

use std::io::Write;

use crate::context::Context;
use crate::op::Op;
use crate::opcode::Opcode;
use crate::temp::{TempIdx, TempKind};
use crate::types::{Cond, Type};

fn cond_name(raw: u32) -> &'static str {
    match Cond::from_raw(raw) {
        Some(c) => c.name(),
        None => "???",
    }
}

fn fmt_temp(ctx: &Context, idx: TempIdx, buf: &mut String) {
    use std::fmt::Write as FmtWrite;
    let i = idx.0 as usize;
    if i >= ctx.nb_temps() as usize {
        let v = idx.0;
        write!(buf, "$0x{v:x}").unwrap();
        return;
    }
    let t = ctx.temp(idx);
    match t.kind {
        TempKind::Const => {
            let v = t.val;
            write!(buf, "$0x{v:x}").unwrap();
        }
        TempKind::Global => {
            if let Some(name) = t.name {
                buf.push_str(name);
            } else {
                write!(buf, "g{i}").unwrap();
            }
        }
        TempKind::Ebb | TempKind::Tb => {
            let local = i as u32 - ctx.nb_globals();
            write!(buf, "tmp{local}").unwrap();
        }
    }
}

fn op_name(op: &Op) -> String {
    let def = op.opc.def();
    if op.opc.is_vector() {
        let lane = 8u32 << op.vece;
        let base = def.name;
        format!("{base}{lane}")
    } else if op.opc.is_int_polymorphic() {
        let suffix = match op.ty {
            Type::I32 => "_i32",
            Type::I64 => "_i64",
            _ => "",
        };
        let base = def.name;
        format!("{base}{suffix}")
    } else {
        def.name.to_string()
    }
}

/// Dump all IR ops in `ctx` to the given writer.
pub fn dump_ops(ctx: &Context, w: &mut impl Write) -> std::io::Result<()> {
    let mut buf = String::with_capacity(128);

    for op in ctx.ops() {
        buf.clear();
        match op.opc {
            Opcode::InsnStart => {
                let pc = op.cargs()[0].0;
                writeln!(w, " ---- 0x{pc:08x}")?;
                continue;
            }
            Opcode::SetLabel => {
                let label_id = op.cargs()[0].0;
                writeln!(w, " L{label_id}:")?;
                continue;
            }
            _ => {}
        }

        let name = op_name(op);
        write!(w, " {name}")?;

        let oargs = op.oargs();
        for (i, &a) in oargs.iter().enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            write!(w, " ")?;
            buf.clear();
            fmt_temp(ctx, a, &mut buf);
            write!(w, "{buf}")?;
        }

        let iargs = op.iargs();
        let has_oargs = !oargs.is_empty();
        for (i, &a) in iargs.iter().enumerate() {
            if has_oargs || i > 0 {
                write!(w, ",")?;
            }
            write!(w, " ")?;
            buf.clear();
            fmt_temp(ctx, a, &mut buf);
            write!(w, "{buf}")?;
        }

        let cargs = op.cargs();
        match op.opc {
            Opcode::BrCond => {
                let cond = cond_name(cargs[0].0);
                let label = cargs[1].0;
                write!(w, ", {cond}, L{label}")?;
            }
            Opcode::SetCond | Opcode::MovCond => {
                let cond = cond_name(cargs[0].0);
                write!(w, ", {cond}")?;
            }
            Opcode::Br => {
                let label = cargs[0].0;
                write!(w, " L{label}")?;
            }
            Opcode::Call => {
                let helper = cargs[0].0;
                write!(w, ", helper#{helper}")?;
            }
            _ => {
                let has_prev = !oargs.is_empty() || !iargs.is_empty();
                for (i, &c) in cargs.iter().enumerate() {
                    if has_prev || i > 0 {
                        write!(w, ",")?;
                    }
                    let v = c.0;
                    write!(w, " $0x{v:x}")?;
                }
            }
        }

        writeln!(w)?;
    }
    Ok(())
}
