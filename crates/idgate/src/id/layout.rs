use core::fmt;

use crate::Identifier;

struct Field {
    name: &'static str,
    bits: u8,
    value: u64,
}

fn fields(id: &Identifier) -> [Field; 4] {
    [
        Field {
            name: "reserved",
            bits: 1,
            value: id.to_raw() >> 63,
        },
        Field {
            name: "timestamp",
            bits: 41,
            value: id.timestamp(),
        },
        Field {
            name: "node_id",
            bits: 10,
            value: id.node_id(),
        },
        Field {
            name: "sequence",
            bits: 12,
            value: id.sequence(),
        },
    ]
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let pad = width.saturating_sub(s.len());
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
}

/// Renders the packed value followed by a table of its bit fields.
pub(crate) fn write_bit_layout_debug(
    f: &mut fmt::Formatter<'_>,
    id: &Identifier,
    type_name: &str,
) -> fmt::Result {
    let fields = fields(id);

    // label, decimal and hex rows share one width per column
    let widths: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label = format!("{} ({})", field.name, field.bits).len();
            let dec = field.value.to_string().len();
            let hex = format!("0x{:x}", field.value).len();
            label.max(dec).max(hex) + 2
        })
        .collect();

    let border = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
        write!(f, "        +")?;
        for &w in &widths {
            write!(f, "{}+", "-".repeat(w))?;
        }
        writeln!(f)
    };

    writeln!(f, "{type_name} {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.to_raw(), id.to_raw())?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    writeln!(f, "    layout     :")?;

    border(f)?;
    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&widths) {
        write!(f, "{}|", center(format!("{} ({})", field.name, field.bits), w))?;
    }
    writeln!(f)?;
    border(f)?;
    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&widths) {
        write!(f, "{}|", center(field.value, w))?;
    }
    writeln!(f)?;
    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&widths) {
        write!(f, "{}|", center(format!("0x{:x}", field.value), w))?;
    }
    writeln!(f)?;
    border(f)?;

    write!(f, "}}")
}
