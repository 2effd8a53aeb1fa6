//! Sector-aware menu and sidebar state

use marops_domain::Sector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub icon: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    /// `producao`, `estoque` or `financeiro`.
    pub key: &'static str,
    pub sector: Sector,
    pub entries: Vec<MenuEntry>,
}

fn all_sections() -> Vec<MenuSection> {
    vec![
        MenuSection {
            key: "producao",
            sector: Sector::Production,
            entries: vec![
                MenuEntry { label: "Início da Produção", icon: "📦", path: "/producao/inicio" },
                MenuEntry { label: "Relatórios", icon: "📊", path: "/producao/relatorios" },
            ],
        },
        MenuSection {
            key: "estoque",
            sector: Sector::Stock,
            entries: vec![
                MenuEntry { label: "Produtos", icon: "❄️", path: "/estoque" },
                MenuEntry { label: "Insumos", icon: "❄️", path: "/estoque" },
                MenuEntry { label: "Camara-Fria", icon: "❄️", path: "/estoque/camara-fria" },
                MenuEntry { label: "Entrada de produtos", icon: "📦", path: "/estoque/entrada" },
                MenuEntry { label: "Entrada de Insumos", icon: "📦", path: "/estoque/entrada" },
            ],
        },
        MenuSection {
            key: "financeiro",
            sector: Sector::Finance,
            entries: vec![
                MenuEntry { label: "Pagamentos", icon: "💰", path: "/financeiro/pagamentos" },
                MenuEntry { label: "Faturamento", icon: "📑", path: "/financeiro/faturamento" },
            ],
        },
    ]
}

/// Menu sections visible to a sector. Administrators see every section.
#[must_use]
pub fn menu_for(sector: &Sector) -> Vec<MenuSection> {
    all_sections()
        .into_iter()
        .filter(|section| *sector == Sector::Admin || section.sector == *sector)
        .collect()
}

/// Collapsible sidebar; labels are hidden while collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sidebar {
    open: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self { open: true }
    }
}

impl Sidebar {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn shows_labels(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_sees_its_own_section() {
        let menu = menu_for(&Sector::Stock);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].key, "estoque");
        assert!(menu[0].entries.iter().any(|e| e.path == "/estoque/camara-fria"));
    }

    #[test]
    fn admin_sees_everything() {
        let keys: Vec<_> = menu_for(&Sector::Admin).iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["producao", "estoque", "financeiro"]);
    }

    #[test]
    fn unknown_sector_gets_no_menu() {
        assert!(menu_for(&Sector::Other("RH".into())).is_empty());
    }

    #[test]
    fn sidebar_starts_open_and_toggles() {
        let mut sidebar = Sidebar::default();
        assert!(sidebar.shows_labels());
        sidebar.toggle();
        assert!(!sidebar.is_open());
    }
}
