#[derive(Clone, Copy, Debug)]
pub struct Glyphs {
    pub double_bond: &'static str,
    pub triple_bond: &'static str,
    pub primer: &'static str,
    pub empty_slot: &'static str,
    pub cursor: &'static str,
    pub peptide_bond: &'static str,
    pub h_separator: &'static str,
    pub selected: &'static str,
    pub unselected: &'static str,
    pub arrow_right: &'static str,
}

impl Glyphs {
    /// Hydrogen bonds between a base and its partner.
    pub fn bond(&self, hydrogen_bonds: u8) -> &'static str {
        if hydrogen_bonds >= 3 {
            self.triple_bond
        } else {
            self.double_bond
        }
    }
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        double_bond: "=",
        triple_bond: "#",
        primer: "P",
        empty_slot: "_",
        cursor: "^",
        peptide_bond: "-",
        h_separator: "-",
        selected: "[x]",
        unselected: "[ ]",
        arrow_right: ">",
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        double_bond: "║",
        triple_bond: "┃",
        primer: "▒",
        empty_slot: "·",
        cursor: "▲",
        peptide_bond: "─",
        h_separator: "─",
        selected: "◉",
        unselected: "○",
        arrow_right: "→",
    }
}
