//! Dispatch pipeline
//!
//! Drives one policy request through admin resolution, authorization, payload
//! decoding, value load, handler invocation, persistence and reply. The first
//! failing stage ends the request; authorization failures touch no state.
//!
//! Also drives the admin removal fan-out across every registered plugin.

use std::time::Duration;

use edm_types::admin_adapter::AdminRecord;
use edm_types::policy_adapter::PolicyRecord;
use edm_types::request::{EdmRequest, EdmResponse, PolicyRequest};
use edm_types::types::FuncOperateType;

use crate::app::AppState;
use crate::lifecycle;
use crate::plugin::{Change, PluginCtx, PolicyDescriptor, PolicyPlugin};
use crate::prelude::*;

/// Serves one request of any kind
pub async fn handle_request(app: &AppState, req: EdmRequest) -> EdmResponse {
	let res = match req {
		EdmRequest::Policy(req) => handle_policy(app, &req).await,
		EdmRequest::EnableAdmin { admin, ent_info, tier, permissions, user_id } => {
			lifecycle::enable_admin(app, &admin, &ent_info, tier, permissions.as_slice(), user_id)
				.await
				.map(|()| None)
		}
		EdmRequest::DisableAdmin { admin, user_id } => {
			lifecycle::disable_admin(app, &admin, user_id).await.map(|()| None)
		}
		EdmRequest::UpdateAdmin { admin, permissions, user_id } => {
			lifecycle::update_admin(app, &admin, permissions.as_slice(), user_id).await.map(|()| None)
		}
		EdmRequest::IsAdminEnabled { admin, user_id } => {
			Ok(Some(lifecycle::is_admin_enabled(app, &admin, user_id).await.to_string()))
		}
		EdmRequest::GetEnterpriseInfo { admin, user_id } => {
			match lifecycle::get_enterprise_info(app, &admin, user_id).await {
				Ok(info) => serde_json::to_string(&info).map(Some).map_err(Error::from),
				Err(err) => Err(err),
			}
		}
	};
	res.into()
}

/// Runs the policy pipeline. Returns the serialized value for GET.
pub async fn handle_policy(app: &AppState, req: &PolicyRequest) -> EdmResult<Option<String>> {
	debug!(code = %req.code, user_id = %req.user_id, admin = %req.admin.package_name, op = %req.op, "Policy request");

	// Resolve admin
	let admin = app.admins.get_admin(&req.admin, req.user_id).await.ok_or_else(|| {
		warn!(admin = %req.admin.package_name, user_id = %req.user_id, "Policy request from unknown admin");
		Error::AdminNotFound
	})?;

	// Authorize
	let Some(plugin) = app.plugins.get(req.code) else {
		warn!(code = %req.code, "Unknown policy code");
		return Err(Error::ParamError(format!("unknown policy code {}", req.code)));
	};
	let desc = plugin.descriptor();
	if admin.tier < desc.min_tier || !app.permissions.check(desc.permission, &admin.permissions) {
		warn!(
			code = %req.code,
			admin = %admin.package_name,
			tier = %admin.tier,
			permission = desc.permission,
			"Policy permission denied"
		);
		return Err(Error::PermissionDenied);
	}

	let ctx = PluginCtx { abilities: &app.abilities, user_id: req.user_id, admin: &admin.package_name };
	let serializer = desc.serializer;

	if req.op == FuncOperateType::Get {
		let current = if desc.is_persisted() {
			app.policies.read_value(req.user_id, req.code, serializer).await?
		} else {
			serializer.default_value()
		};
		let value = plugin.on_get(&ctx, current, req.arg.as_deref()).await?;
		return Ok(Some(serializer.serialize(&value)?));
	}

	// Decode payload
	let data = serializer.deserialize(req.payload.as_deref().unwrap_or_default())?;

	if !desc.is_persisted() {
		let mut current = serializer.default_value();
		invoke_mutation(plugin.as_ref(), &ctx, req.op, data, &mut current).await?;
		return Ok(None);
	}

	// Read-modify-write under the key lock
	let _guard = app.policies.lock(req.user_id, req.code).await;
	// a concurrent disable may have removed the admin since it was resolved
	if !app.admins.is_registered(&admin).await {
		warn!(admin = %admin.package_name, user_id = %req.user_id, "Admin removed during policy request");
		return Err(Error::AdminNotFound);
	}
	let stored = app.policies.read(req.user_id, req.code).await?;
	let mut current = match &stored {
		Some(record) => serializer.deserialize_stored(&record.value)?,
		None => serializer.default_value(),
	};
	let mut record = stored.unwrap_or_default();

	let change = invoke_mutation(plugin.as_ref(), &ctx, req.op, data.clone(), &mut current).await?;
	if change == Change::Unchanged {
		debug!(code = %req.code, "Empty policy input, nothing to persist");
		return Ok(None);
	}

	record.value = serializer.serialize(&current)?;
	update_contributions(desc, &mut record, &admin.package_name, req.op, &data)?;
	app.policies.write(req.user_id, req.code, &record, serializer).await?;

	info!(code = %req.code, admin = %admin.package_name, op = %req.op, "Policy updated");
	Ok(None)
}

async fn invoke_mutation(
	plugin: &dyn PolicyPlugin,
	ctx: &PluginCtx<'_>,
	op: FuncOperateType,
	data: PolicyValue,
	current: &mut PolicyValue,
) -> EdmResult<Change> {
	match op {
		FuncOperateType::Set => plugin.on_set(ctx, data, current).await,
		FuncOperateType::Remove => plugin.on_remove(ctx, data, current).await,
		FuncOperateType::Get => Err(Error::OperationNotSupported),
	}
}

/// Records what the acting admin contributed to the stored value
fn update_contributions(
	desc: &PolicyDescriptor,
	record: &mut PolicyRecord,
	admin: &str,
	op: FuncOperateType,
	data: &PolicyValue,
) -> EdmResult<()> {
	let serializer = desc.serializer;
	match (desc.is_additive(), op) {
		(true, FuncOperateType::Set) => {
			let prev = match record.contribution(admin) {
				Some(value) => serializer.deserialize_stored(value)?,
				None => serializer.default_value(),
			};
			let merged = serializer.set_union(&prev, data)?;
			record.set_contribution(admin, serializer.serialize(&merged)?);
		}
		(true, _) => {
			// the rule is lifted for everyone, not only for the acting admin
			for contribution in &mut record.contributions {
				let value = serializer.deserialize_stored(&contribution.value)?;
				contribution.value = serializer.serialize(&serializer.set_difference(&value, data)?)?;
			}
			let empty = serializer.serialize(&serializer.default_value())?;
			record.contributions.retain(|c| c.value != empty);
		}
		(false, FuncOperateType::Set) => {
			record.set_contribution(admin, record.value.clone());
		}
		(false, _) => {
			record.take_contribution(admin);
		}
	}
	Ok(())
}

/// Value the remaining contributions retain
fn retained_value(desc: &PolicyDescriptor, record: &PolicyRecord) -> EdmResult<PolicyValue> {
	let serializer = desc.serializer;
	if desc.is_additive() {
		let mut retained = serializer.default_value();
		for contribution in &record.contributions {
			let value = serializer.deserialize_stored(&contribution.value)?;
			retained = serializer.set_union(&retained, &value)?;
		}
		Ok(retained)
	} else {
		match record.contributions.last() {
			Some(newest) => serializer.deserialize_stored(&newest.value),
			None => Ok(serializer.default_value()),
		}
	}
}

/// Retracts everything `admin` contributed, policy by policy. The admin record
/// is already gone. A failing or stuck plugin is logged and does not stop the
/// others.
pub async fn remove_admin_policies(app: &AppState, admin: &AdminRecord) {
	let codes = match app.policies.list(admin.user_id).await {
		Ok(codes) => codes,
		Err(err) => {
			error!(admin = %admin.package_name, user_id = %admin.user_id, "Listing policies failed: {}", err);
			return;
		}
	};

	for code in codes {
		let Some(plugin) = app.plugins.get(code) else {
			debug!(%code, "Stored policy without plugin");
			continue;
		};
		if !plugin.descriptor().is_persisted() {
			continue;
		}
		if let Err(err) = retract_admin(app, plugin.as_ref(), admin).await {
			warn!(%code, admin = %admin.package_name, "Admin retraction failed: {}", err);
		}
	}
}

async fn retract_admin(app: &AppState, plugin: &dyn PolicyPlugin, admin: &AdminRecord) -> EdmResult<()> {
	let desc = plugin.descriptor();
	let serializer = desc.serializer;
	let ctx = PluginCtx { abilities: &app.abilities, user_id: admin.user_id, admin: &admin.package_name };
	let hook_timeout = app.opts.hook_timeout;

	let lifted = {
		let _guard = app.policies.lock(admin.user_id, desc.code).await;
		let Some(mut record) = app.policies.read(admin.user_id, desc.code).await? else {
			return Ok(());
		};
		let Some(contribution) = record.take_contribution(&admin.package_name) else {
			return Ok(());
		};
		let contribution = serializer.deserialize_stored(&contribution)?;

		let mut current = retained_value(desc, &record)?;
		let lifted = if desc.is_additive() {
			serializer.set_difference(&contribution, &current)?
		} else {
			contribution
		};

		// Without the hook the subsystem keeps the old value, so the stored value
		// stays as well. The contribution is dropped either way.
		let res = bounded(hook_timeout, plugin.on_admin_remove(&ctx, &lifted, &mut current)).await;
		match res {
			Ok(()) => record.value = serializer.serialize(&current)?,
			Err(err) => {
				warn!(code = %desc.code, admin = %admin.package_name, "Admin removal hook failed: {}", err);
			}
		}
		app.policies.write(admin.user_id, desc.code, &record, serializer).await?;
		debug!(code = %desc.code, admin = %admin.package_name, "Admin contribution retracted");
		lifted
	};

	if let Err(err) = bounded(hook_timeout, plugin.on_admin_remove_done(&ctx, &lifted)).await {
		warn!(code = %desc.code, admin = %admin.package_name, "Admin removal notification failed: {}", err);
	}
	Ok(())
}

/// Runs a plugin hook with an upper bound on its duration
async fn bounded<F>(limit: Duration, hook: F) -> EdmResult<()>
where
	F: Future<Output = EdmResult<()>>,
{
	match tokio::time::timeout(limit, hook).await {
		Ok(res) => res,
		Err(_) => Err(Error::SystemAbnormally(format!("plugin hook timed out after {:?}", limit))),
	}
}

#[cfg(test)]
mod tests {
	use async_trait::async_trait;
	use std::{collections::HashMap, sync::Arc};

	use edm_types::types::{AdminIdentity, EntInfo};
	use edm_types::worker::WorkerPool;

	use super::*;
	use crate::ability_manager::AbilityManager;
	use crate::admin::AdminManager;
	use crate::app::AppBuilderOpts;
	use crate::conn_manager::AdminConnManager;
	use crate::lifecycle;
	use crate::permission::PermissionCatalog;
	use crate::plugin::{PluginRegistry, Storage};
	use crate::policy_store::PolicyStore;
	use crate::serializer::Serializer;
	use crate::test_util::{MemAdminAdapter, MemPolicyAdapter};

	const PERM: &str = "ohos.permission.EDM_TEST_PERMISSION";
	const LIST: PolicyCode = PolicyCode(1);
	const FLAG: PolicyCode = PolicyCode(2);
	const STUCK: PolicyCode = PolicyCode(3);
	const USER: UserId = UserId::DEFAULT;

	/// Additive list without side effects
	#[derive(Debug)]
	struct ListPlugin(PolicyDescriptor);

	#[async_trait]
	impl PolicyPlugin for ListPlugin {
		fn descriptor(&self) -> &PolicyDescriptor {
			&self.0
		}

		async fn on_set(
			&self,
			_ctx: &PluginCtx<'_>,
			data: PolicyValue,
			current: &mut PolicyValue,
		) -> EdmResult<Change> {
			if data.is_empty() {
				return Ok(Change::Unchanged);
			}
			*current = Serializer::StringArray.set_union(current, &data)?;
			Ok(Change::Updated)
		}

		async fn on_remove(
			&self,
			_ctx: &PluginCtx<'_>,
			data: PolicyValue,
			current: &mut PolicyValue,
		) -> EdmResult<Change> {
			if data.is_empty() {
				return Ok(Change::Unchanged);
			}
			*current = Serializer::StringArray.set_difference(current, &data)?;
			Ok(Change::Updated)
		}
	}

	/// Single-writer flag
	#[derive(Debug)]
	struct FlagPlugin(PolicyDescriptor);

	#[async_trait]
	impl PolicyPlugin for FlagPlugin {
		fn descriptor(&self) -> &PolicyDescriptor {
			&self.0
		}

		async fn on_set(
			&self,
			_ctx: &PluginCtx<'_>,
			data: PolicyValue,
			current: &mut PolicyValue,
		) -> EdmResult<Change> {
			*current = data;
			Ok(Change::Updated)
		}
	}

	/// Additive list whose removal notification never finishes
	#[derive(Debug)]
	struct StuckPlugin(PolicyDescriptor);

	#[async_trait]
	impl PolicyPlugin for StuckPlugin {
		fn descriptor(&self) -> &PolicyDescriptor {
			&self.0
		}

		async fn on_set(
			&self,
			_ctx: &PluginCtx<'_>,
			data: PolicyValue,
			current: &mut PolicyValue,
		) -> EdmResult<Change> {
			*current = Serializer::StringArray.set_union(current, &data)?;
			Ok(Change::Updated)
		}

		async fn on_admin_remove_done(&self, _ctx: &PluginCtx<'_>, _lifted: &PolicyValue) -> EdmResult<()> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(())
		}
	}

	async fn create_app() -> AppState {
		let permissions = Arc::new(PermissionCatalog::new());
		permissions.add_permission(PERM, AdminTier::Enterprise);

		let mut registry = PluginRegistry::new();
		registry
			.register(Arc::new(ListPlugin(PolicyDescriptor {
				code: LIST,
				name: "list",
				permission: PERM,
				min_tier: AdminTier::Enterprise,
				storage: Storage::Additive,
				serializer: Serializer::StringArray,
			})))
			.expect("register list");
		registry
			.register(Arc::new(FlagPlugin(PolicyDescriptor {
				code: FLAG,
				name: "flag",
				permission: PERM,
				min_tier: AdminTier::Enterprise,
				storage: Storage::SingleWriter,
				serializer: Serializer::Bool,
			})))
			.expect("register flag");
		registry
			.register(Arc::new(StuckPlugin(PolicyDescriptor {
				code: STUCK,
				name: "stuck",
				permission: PERM,
				min_tier: AdminTier::Enterprise,
				storage: Storage::Additive,
				serializer: Serializer::StringArray,
			})))
			.expect("register stuck");

		let worker = Arc::new(WorkerPool::new(0, 1, 1));
		let admins = AdminManager::load(Arc::new(MemAdminAdapter::default()), permissions.clone())
			.await
			.expect("load admins");
		AppState {
			opts: AppBuilderOpts::default(),
			worker: worker.clone(),
			permissions,
			admins,
			plugins: registry.freeze(),
			policies: PolicyStore::new(Arc::new(MemPolicyAdapter::default())),
			abilities: AbilityManager::new(worker, HashMap::new()),
			conn: AdminConnManager::new(false),
		}
	}

	fn identity(pkg: &str) -> AdminIdentity {
		AdminIdentity::new(pkg, "testDemo")
	}

	async fn add_admin(app: &AppState, pkg: &str, tier: AdminTier) {
		app.admins
			.set_admin_value(&identity(pkg), &EntInfo::default(), tier, &[PERM], USER)
			.await
			.expect("register admin");
	}

	fn req(pkg: &str, code: PolicyCode, op: FuncOperateType, payload: Option<&str>) -> PolicyRequest {
		PolicyRequest {
			code,
			op,
			admin: identity(pkg),
			user_id: USER,
			payload: payload.map(ToString::to_string),
			arg: None,
		}
	}

	async fn get(app: &AppState, pkg: &str, code: PolicyCode) -> String {
		handle_policy(app, &req(pkg, code, FuncOperateType::Get, None))
			.await
			.expect("get")
			.expect("get returns a value")
	}

	#[tokio::test]
	async fn test_union_difference_round_trip() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;

		for payload in [r#"["a","b"]"#, r#"["b","c"]"#] {
			handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some(payload)))
				.await
				.expect("set");
		}
		assert_eq!(get(&app, "com.edm.a", LIST).await, r#"["a","b","c"]"#);

		handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Remove, Some(r#"["b"]"#)))
			.await
			.expect("remove");
		assert_eq!(get(&app, "com.edm.a", LIST).await, r#"["a","c"]"#);
	}

	#[tokio::test]
	async fn test_empty_input_changes_nothing() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;

		let res = handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some("[]"))).await;
		assert!(matches!(res, Ok(None)));
		let res = handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Remove, Some("[]"))).await;
		assert!(matches!(res, Ok(None)));
		assert!(app.policies.read(USER, LIST).await.expect("read").is_none());
	}

	#[tokio::test]
	async fn test_authorization_failures() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;
		app.admins
			.set_admin_value::<&str>(&identity("com.edm.normal"), &EntInfo::default(), AdminTier::Normal, &[], USER)
			.await
			.expect("normal admin");

		let res = handle_policy(&app, &req("com.edm.none", LIST, FuncOperateType::Get, None)).await;
		assert!(matches!(res, Err(Error::AdminNotFound)));

		let mut wrong_ability = req("com.edm.a", LIST, FuncOperateType::Get, None);
		wrong_ability.admin.ability_name = "other".into();
		assert!(matches!(handle_policy(&app, &wrong_ability).await, Err(Error::AdminNotFound)));

		let res = handle_policy(&app, &req("com.edm.a", PolicyCode(99), FuncOperateType::Get, None)).await;
		assert!(matches!(res, Err(Error::ParamError(_))));

		let res = handle_policy(&app, &req("com.edm.normal", LIST, FuncOperateType::Get, None)).await;
		assert!(matches!(res, Err(Error::PermissionDenied)));
	}

	#[tokio::test]
	async fn test_malformed_payload_and_missing_handler() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;

		let res = handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some("[oops"))).await;
		assert!(matches!(res, Err(Error::ParamError(_))));

		let res = handle_policy(&app, &req("com.edm.a", FLAG, FuncOperateType::Remove, Some("true"))).await;
		assert!(matches!(res, Err(Error::OperationNotSupported)));
	}

	#[tokio::test]
	async fn test_removal_keeps_entries_other_admins_hold() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;
		add_admin(&app, "com.edm.b", AdminTier::Enterprise).await;

		handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some(r#"["x","shared"]"#)))
			.await
			.expect("set a");
		handle_policy(&app, &req("com.edm.b", LIST, FuncOperateType::Set, Some(r#"["shared","y"]"#)))
			.await
			.expect("set b");

		let admin = app.admins.get_admin_by_pkg_name("com.edm.a", USER).await.expect("admin a");
		remove_admin_policies(&app, &admin).await;

		assert_eq!(get(&app, "com.edm.b", LIST).await, r#"["shared","y"]"#);
		let record = app.policies.read(USER, LIST).await.expect("read").expect("record");
		assert_eq!(record.contributions.len(), 1);
		assert_eq!(record.contributions[0].admin.as_ref(), "com.edm.b");
	}

	#[tokio::test]
	async fn test_single_writer_falls_back_to_remaining_admin() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;
		add_admin(&app, "com.edm.b", AdminTier::Enterprise).await;

		handle_policy(&app, &req("com.edm.a", FLAG, FuncOperateType::Set, Some("true")))
			.await
			.expect("set a");
		handle_policy(&app, &req("com.edm.b", FLAG, FuncOperateType::Set, Some("false")))
			.await
			.expect("set b");
		handle_policy(&app, &req("com.edm.a", FLAG, FuncOperateType::Set, Some("true")))
			.await
			.expect("set a again");
		assert_eq!(get(&app, "com.edm.b", FLAG).await, "true");

		let admin = app.admins.get_admin_by_pkg_name("com.edm.a", USER).await.expect("admin a");
		remove_admin_policies(&app, &admin).await;
		assert_eq!(get(&app, "com.edm.b", FLAG).await, "false");
	}

	#[tokio::test]
	async fn test_remove_lifts_rule_for_every_admin() {
		let app = create_app().await;
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;
		add_admin(&app, "com.edm.b", AdminTier::Enterprise).await;

		handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some(r#"["x"]"#)))
			.await
			.expect("set a");
		handle_policy(&app, &req("com.edm.b", LIST, FuncOperateType::Set, Some(r#"["x","y"]"#)))
			.await
			.expect("set b");
		handle_policy(&app, &req("com.edm.b", LIST, FuncOperateType::Remove, Some(r#"["x"]"#)))
			.await
			.expect("remove");

		let record = app.policies.read(USER, LIST).await.expect("read").expect("record");
		assert_eq!(record.value, r#"["y"]"#);
		assert_eq!(record.contributions.len(), 1);
		assert_eq!(record.contribution("com.edm.b"), Some(r#"["y"]"#));
	}

	#[tokio::test]
	async fn test_set_queued_behind_admin_removal_is_rejected() {
		let app = Arc::new(create_app().await);
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;

		let guard = app.policies.lock(USER, LIST).await;
		let pending = {
			let app = app.clone();
			tokio::spawn(async move {
				handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some(r#"["y"]"#))).await
			})
		};
		// the request resolves the admin, then waits for the key
		tokio::time::sleep(Duration::from_millis(50)).await;

		let admin = app.admins.delete_admin(&identity("com.edm.a"), USER).await.expect("delete").expect("admin a");
		drop(guard);
		assert!(matches!(pending.await.expect("join"), Err(Error::AdminNotFound)));

		remove_admin_policies(&app, &admin).await;
		assert!(app.policies.read(USER, LIST).await.expect("read").is_none());

		// a new registration under the same name starts empty
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;
		assert_eq!(get(&app, "com.edm.a", LIST).await, "[]");
	}

	#[tokio::test]
	async fn test_stuck_hook_does_not_block_disable() {
		let mut app = create_app().await;
		app.opts.hook_timeout = Duration::from_millis(100);
		add_admin(&app, "com.edm.a", AdminTier::Enterprise).await;
		add_admin(&app, "com.edm.b", AdminTier::Enterprise).await;

		handle_policy(&app, &req("com.edm.a", STUCK, FuncOperateType::Set, Some(r#"["x"]"#)))
			.await
			.expect("set stuck");
		handle_policy(&app, &req("com.edm.a", LIST, FuncOperateType::Set, Some(r#"["z"]"#)))
			.await
			.expect("set list");

		let res = tokio::time::timeout(
			Duration::from_secs(5),
			lifecycle::disable_admin(&app, &identity("com.edm.a"), USER),
		)
		.await;
		assert!(matches!(res, Ok(Ok(()))));
		assert!(app.admins.get_admin(&identity("com.edm.a"), USER).await.is_none());

		// both policies were retracted despite the stuck notification
		assert_eq!(get(&app, "com.edm.b", STUCK).await, "[]");
		assert_eq!(get(&app, "com.edm.b", LIST).await, "[]");
	}
}

// vim: ts=4
