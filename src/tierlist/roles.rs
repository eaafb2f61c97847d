use super::{Gamemode, Tier};

/// Config-driven mapping from tiers and gamemodes to guild role names.
#[derive(Debug, Clone)]
pub struct RoleTable {
    tier_role_format: String,
    staff_roles: Vec<String>,
    result_roles: Vec<String>,
    admin_roles: Vec<String>,
}

/// Roles to swap on a member after a tier result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    pub remove: Option<String>,
    pub add: Option<String>,
}

impl RoleTable {
    pub fn new(
        tier_role_format: String,
        staff_roles: Vec<String>,
        result_roles: Vec<String>,
        admin_roles: Vec<String>,
    ) -> Self {
        Self {
            tier_role_format,
            staff_roles,
            result_roles,
            admin_roles,
        }
    }

    /// `None` for `Unranked`, which carries no role.
    pub fn tier_role_name(&self, gamemode: Gamemode, tier: Tier) -> Option<String> {
        tier.is_ranked().then(|| {
            self.tier_role_format
                .replace("{tier}", tier.as_str())
                .replace("{gamemode}", gamemode.display_name())
        })
    }

    pub fn role_change(&self, gamemode: Gamemode, previous: Tier, awarded: Tier) -> RoleChange {
        let add = self.tier_role_name(gamemode, awarded);
        let remove = self
            .tier_role_name(gamemode, previous)
            .filter(|old| Some(old) != add.as_ref());
        RoleChange { remove, add }
    }

    pub fn staff_roles(&self) -> &[String] {
        &self.staff_roles
    }

    pub fn can_submit_result(&self, member_roles: &[String], gamemode: Gamemode) -> bool {
        let tester_role = gamemode.tester_role_name();
        member_roles
            .iter()
            .any(|role| *role == tester_role || self.result_roles.contains(role))
    }

    pub fn is_admin(&self, member_roles: &[String]) -> bool {
        member_roles.iter().any(|role| self.admin_roles.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RoleTable {
        RoleTable::new(
            "{tier} {gamemode}".into(),
            vec!["Senior Tester".into(), "Moderator".into()],
            vec!["Senior Tester".into(), "Admin".into()],
            vec!["Admin".into()],
        )
    }

    #[test]
    fn tier_role_names_follow_the_format() {
        assert_eq!(
            table().tier_role_name(Gamemode::Sword, Tier::Ht3),
            Some("HT3 Sword".into())
        );
        assert_eq!(table().tier_role_name(Gamemode::Sword, Tier::Unranked), None);

        let custom = RoleTable::new("{gamemode} | {tier}".into(), vec![], vec![], vec![]);
        assert_eq!(
            custom.tier_role_name(Gamemode::Uhc, Tier::Lt1),
            Some("UHC | LT1".into())
        );
    }

    #[test]
    fn first_result_only_adds_the_awarded_role() {
        let change = table().role_change(Gamemode::Sword, Tier::Unranked, Tier::Ht3);
        assert_eq!(
            change,
            RoleChange {
                remove: None,
                add: Some("HT3 Sword".into())
            }
        );
    }

    #[test]
    fn promotion_swaps_tier_roles() {
        let change = table().role_change(Gamemode::Mace, Tier::Lt4, Tier::Ht3);
        assert_eq!(change.remove.as_deref(), Some("LT4 Mace"));
        assert_eq!(change.add.as_deref(), Some("HT3 Mace"));
    }

    #[test]
    fn same_tier_keeps_the_role() {
        let change = table().role_change(Gamemode::Axe, Tier::Ht3, Tier::Ht3);
        assert_eq!(change.remove, None);
        assert_eq!(change.add.as_deref(), Some("HT3 Axe"));
    }

    #[test]
    fn result_permission_by_tester_or_staff_role() {
        let table = table();
        assert!(table.can_submit_result(&["Sword Tester".into()], Gamemode::Sword));
        assert!(!table.can_submit_result(&["Sword Tester".into()], Gamemode::Axe));
        assert!(table.can_submit_result(&["Admin".into()], Gamemode::Axe));
        assert!(!table.can_submit_result(&["Moderator".into()], Gamemode::Axe));
        assert!(table.is_admin(&["Admin".into()]));
    }
}
