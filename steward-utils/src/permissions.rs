use twilight_model::guild::{Permissions, Role};
use twilight_model::id::{
    Id,
    marker::{GuildMarker, RoleMarker},
};

use crate::transport::{Invocation, Transport};

/// Convert a permission bitset into a sorted display list.
///
/// If `ADMINISTRATOR` is present, only `ADMINISTRATOR` is returned because
/// it implicitly grants all permissions.
pub fn permission_names(perms: Permissions) -> Vec<String> {
    if perms.contains(Permissions::ADMINISTRATOR) {
        return vec!["ADMINISTRATOR".to_owned()];
    }

    let mut names: Vec<String> = perms
        .iter_names()
        .map(|(name, _flag)| name.to_owned())
        .collect();
    names.sort_unstable();
    names
}

/// Fold the `@everyone` role and the member's roles into one permission set.
pub fn fold_role_permissions(
    guild_id: Id<GuildMarker>,
    member_roles: &[Id<RoleMarker>],
    roles: &[Role],
) -> Permissions {
    let mut resolved = Permissions::empty();

    for role in roles {
        if role.id == guild_id.cast() || member_roles.contains(&role.id) {
            resolved |= role.permissions;
        }
    }

    resolved
}

/// Check whether the invoker has a required permission (or administrator).
///
/// Returns `Ok(false)` outside a guild context.
pub async fn invoker_has_permission(
    transport: &dyn Transport,
    invocation: &Invocation,
    required: Permissions,
) -> anyhow::Result<bool> {
    let Some(guild_id) = invocation.guild_id else {
        return Ok(false);
    };

    let perms = transport
        .member_permissions(guild_id, invocation.author_id)
        .await?;

    Ok(perms.contains(Permissions::ADMINISTRATOR) || perms.contains(required))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_collapses_names() {
        let names = permission_names(Permissions::ADMINISTRATOR | Permissions::MANAGE_GUILD);
        assert_eq!(names, vec!["ADMINISTRATOR".to_owned()]);
    }

    #[test]
    fn names_are_sorted() {
        let names = permission_names(Permissions::MANAGE_ROLES | Permissions::MANAGE_GUILD);
        assert_eq!(
            names,
            vec!["MANAGE_GUILD".to_owned(), "MANAGE_ROLES".to_owned()]
        );
    }
}
