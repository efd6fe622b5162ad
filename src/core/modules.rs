use crate::domain::model::{DispatchStrategy, ModuleSpec};

pub const VALID_MODULES: &[ModuleSpec] = &[
    ModuleSpec {
        name: "contacts",
        strategy: DispatchStrategy::ListThenDetail,
    },
    ModuleSpec {
        name: "forms/submissions",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "invoices",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "campaigns",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "opportunities/search",
        strategy: DispatchStrategy::LocationSearch,
    },
    ModuleSpec {
        name: "funnels/funnel/list",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "payments/orders",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "payments/transactions",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "payments/subscriptions",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "products",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "surveys/submissions",
        strategy: DispatchStrategy::Passthrough,
    },
    ModuleSpec {
        name: "users/search",
        strategy: DispatchStrategy::Passthrough,
    },
];

/// 允許轉送的模組清單，啟動時建立後不再變動
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: &'static [ModuleSpec],
}

impl ModuleRegistry {
    pub fn builtin() -> Self {
        Self {
            modules: VALID_MODULES,
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|module| module.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|module| module.name)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
