use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use crate::errors::{StoreError, StoreResult};
use crate::models::{Expense, Member, User, Workspace};
use super::store::{DeletedTree, Store};

// Key layout
//   workspaces                      list of workspace ids, creation order
//   workspace:{id}                  workspace document
//   workspace:{id}:total_expenses   cached total, INCRBYFLOAT target
//   workspace:{id}:members          list of member ids
//   member:{id}                     member document
//   member:{id}:expenses            list of expense ids
//   expense:{id}                    expense document
//   user:{username}                 user document
//   reset_token:{token}             username, expires with the token
mod keys {
    use uuid::Uuid;

    pub const WORKSPACES: &str = "workspaces";

    pub fn workspace(id: Uuid) -> String {
        format!("workspace:{}", id)
    }

    pub fn workspace_total(id: Uuid) -> String {
        format!("workspace:{}:total_expenses", id)
    }

    pub fn workspace_members(id: Uuid) -> String {
        format!("workspace:{}:members", id)
    }

    pub fn member(id: Uuid) -> String {
        format!("member:{}", id)
    }

    pub fn member_expenses(id: Uuid) -> String {
        format!("member:{}:expenses", id)
    }

    pub fn expense(id: Uuid) -> String {
        format!("expense:{}", id)
    }

    pub fn user(username: &str) -> String {
        format!("user:{}", username)
    }

    pub fn reset_token(token: &str) -> String {
        format!("reset_token:{}", token)
    }
}

// KEYS[1] = workspace document, KEYS[2] = total; ARGV[1] = delta
const INCREMENT_TOTAL: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return redis.call('INCRBYFLOAT', KEYS[2], ARGV[1])
end
return false
"#;

// KEYS[1] = workspace document, KEYS[2] = total; ARGV[1] = new total
const SET_TOTAL: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('SET', KEYS[2], ARGV[1])
    return 1
end
return 0
"#;

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(client: Client) -> StoreResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

async fn get_doc<T: DeserializeOwned>(
    conn: &mut ConnectionManager,
    key: &str,
) -> StoreResult<Option<T>> {
    let data: Option<String> = conn.get(key).await?;
    data.map(|data| decode(key, &data)).transpose()
}

// MGET over document keys, skipping ids whose document has gone.
async fn get_docs<T: DeserializeOwned>(
    conn: &mut ConnectionManager,
    keys: Vec<String>,
) -> StoreResult<Vec<T>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let values: Vec<Option<String>> = redis::cmd("MGET")
        .arg(&keys)
        .query_async(conn)
        .await?;

    let mut docs = Vec::with_capacity(values.len());
    for (key, value) in keys.iter().zip(values) {
        match value {
            Some(data) => docs.push(decode(key, &data)?),
            None => tracing::warn!("Index points at missing document {}", key),
        }
    }
    Ok(docs)
}

async fn get_ids(conn: &mut ConnectionManager, key: &str) -> StoreResult<Vec<Uuid>> {
    let raw: Vec<String> = conn.lrange(key, 0, -1).await?;
    raw.into_iter()
        .map(|value| {
            Uuid::parse_str(&value).map_err(|_| StoreError::Malformed {
                key: key.to_string(),
                value,
            })
        })
        .collect()
}

fn decode<T: DeserializeOwned>(key: &str, data: &str) -> StoreResult<T> {
    serde_json::from_str(data).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

fn encode<T: Serialize>(value: &T) -> StoreResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn parse_total(key: &str, value: Option<String>) -> StoreResult<f64> {
    match value {
        None => Ok(0.0),
        Some(raw) => raw.parse().map_err(|_| StoreError::Malformed {
            key: key.to_string(),
            value: raw,
        }),
    }
}

// Overlays the separately stored total and member list on a workspace document.
async fn hydrate_workspace(
    conn: &mut ConnectionManager,
    mut workspace: Workspace,
) -> StoreResult<Workspace> {
    let total_key = keys::workspace_total(workspace.id);
    let total: Option<String> = conn.get(&total_key).await?;
    workspace.total_expenses = parse_total(&total_key, total)?;
    workspace.members = get_ids(conn, &keys::workspace_members(workspace.id)).await?;
    Ok(workspace)
}

#[async_trait]
impl Store for RedisStore {
    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let mut doc = workspace.clone();
        doc.total_expenses = 0.0;
        doc.members.clear();

        redis::pipe()
            .atomic()
            .set(keys::workspace(workspace.id), encode(&doc)?)
            .ignore()
            .set(keys::workspace_total(workspace.id), workspace.total_expenses)
            .ignore()
            .rpush(keys::WORKSPACES, workspace.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        let mut conn = self.conn.clone();
        match get_doc::<Workspace>(&mut conn, &keys::workspace(id)).await? {
            Some(workspace) => Ok(Some(hydrate_workspace(&mut conn, workspace).await?)),
            None => Ok(None),
        }
    }

    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        let mut conn = self.conn.clone();
        let ids = get_ids(&mut conn, keys::WORKSPACES).await?;
        let docs: Vec<Workspace> =
            get_docs(&mut conn, ids.into_iter().map(keys::workspace).collect()).await?;

        let mut workspaces = Vec::with_capacity(docs.len());
        for doc in docs {
            workspaces.push(hydrate_workspace(&mut conn, doc).await?);
        }
        Ok(workspaces)
    }

    async fn increment_workspace_total(&self, id: Uuid, delta: f64) -> StoreResult<Option<f64>> {
        let mut conn = self.conn.clone();
        let total_key = keys::workspace_total(id);
        let script = Script::new(INCREMENT_TOTAL);
        let total: Option<String> = script
            .key(keys::workspace(id))
            .key(&total_key)
            .arg(delta)
            .invoke_async(&mut conn)
            .await?;

        match total {
            Some(raw) => Ok(Some(parse_total(&total_key, Some(raw))?)),
            None => Ok(None),
        }
    }

    async fn set_workspace_total(&self, id: Uuid, total: f64) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let script = Script::new(SET_TOTAL);
        let updated: i32 = script
            .key(keys::workspace(id))
            .key(keys::workspace_total(id))
            .arg(total)
            .invoke_async(&mut conn)
            .await?;
        Ok(updated == 1)
    }

    async fn delete_workspace_tree(&self, id: Uuid) -> StoreResult<Option<DeletedTree>> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(keys::workspace(id)).await?;
        if !exists {
            return Ok(None);
        }

        let member_ids = get_ids(&mut conn, &keys::workspace_members(id)).await?;
        let mut expense_ids = Vec::new();
        for member_id in &member_ids {
            expense_ids.extend(get_ids(&mut conn, &keys::member_expenses(*member_id)).await?);
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for expense_id in &expense_ids {
            pipe.del(keys::expense(*expense_id)).ignore();
        }
        for member_id in &member_ids {
            pipe.del(keys::member(*member_id)).ignore();
            pipe.del(keys::member_expenses(*member_id)).ignore();
        }
        pipe.del(keys::workspace(id)).ignore();
        pipe.del(keys::workspace_total(id)).ignore();
        pipe.del(keys::workspace_members(id)).ignore();
        pipe.lrem(keys::WORKSPACES, 0, id.to_string()).ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;

        Ok(Some(DeletedTree {
            members: member_ids.len(),
            expenses: expense_ids.len(),
        }))
    }

    async fn insert_member(&self, member: &Member) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(keys::member(member.id), encode(member)?)
            .ignore()
            .rpush(keys::workspace_members(member.workspace_id), member.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> StoreResult<Option<Member>> {
        let mut conn = self.conn.clone();
        get_doc(&mut conn, &keys::member(id)).await
    }

    async fn list_members(&self, workspace_id: Uuid) -> StoreResult<Vec<Member>> {
        let mut conn = self.conn.clone();
        let ids = get_ids(&mut conn, &keys::workspace_members(workspace_id)).await?;
        get_docs(&mut conn, ids.into_iter().map(keys::member).collect()).await
    }

    async fn set_member_total(&self, id: Uuid, total: f64) -> StoreResult<Option<Member>> {
        let mut conn = self.conn.clone();
        let key = keys::member(id);
        let Some(mut member) = get_doc::<Member>(&mut conn, &key).await? else {
            return Ok(None);
        };
        member.total_expenses = total;
        // XX: a member removed by a cascade since the GET stays removed
        let written: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(encode(&member)?)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        Ok(written.map(|_| member))
    }

    async fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(keys::expense(expense.id), encode(expense)?)
            .ignore()
            .rpush(keys::member_expenses(expense.member_id), expense.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_expense(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        let mut conn = self.conn.clone();
        get_doc(&mut conn, &keys::expense(id)).await
    }

    async fn list_expenses(&self, member_id: Uuid) -> StoreResult<Vec<Expense>> {
        let mut conn = self.conn.clone();
        let ids = get_ids(&mut conn, &keys::member_expenses(member_id)).await?;
        get_docs(&mut conn, ids.into_iter().map(keys::expense).collect()).await
    }

    async fn delete_expense(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let Some(expense) = get_doc::<Expense>(&mut conn, &keys::expense(id)).await? else {
            return Ok(false);
        };
        // Only the caller whose DEL removed the key reports success
        let (deleted,): (i64,) = redis::pipe()
            .atomic()
            .del(keys::expense(id))
            .lrem(keys::member_expenses(expense.member_id), 0, id.to_string())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn.clone();
        get_doc(&mut conn, &keys::user(username)).await
    }

    async fn create_user(&self, user: &User) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(keys::user(&user.username))
            .arg(encode(user)?)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(keys::user(&user.username), encode(user)?)
            .ignore();

        // Stale index entries are harmless: lookups re-check the user's own token.
        if let (Some(token), Some(expiry)) = (&user.reset_token, user.reset_token_expiry) {
            let ttl = (expiry - chrono::Utc::now()).num_seconds().max(1);
            pipe.cmd("SET")
                .arg(keys::reset_token(token))
                .arg(&user.username)
                .arg("EX")
                .arg(ttl)
                .ignore();
        }

        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    async fn find_user_by_reset_token(&self, token: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn.clone();
        let username: Option<String> = conn.get(keys::reset_token(token)).await?;
        let Some(username) = username else {
            return Ok(None);
        };
        let user = get_doc::<User>(&mut conn, &keys::user(&username)).await?;
        Ok(user.filter(|user| user.reset_token.as_deref() == Some(token)))
    }
}
