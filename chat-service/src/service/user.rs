//! Registration, login and user maintenance

use uuid::Uuid;

use super::{blocking, prepare_filter, Filtered};
use crate::auth::{JwtIssuer, PasswordHasher, TokenGenerator};
use crate::domain::{
    ActivationStatus, LoginInput, LoginOutput, NewUser, Personnel, RegisterUserInput,
    UpdateUserInput, User, UserChanges,
};
use crate::handlers::{ApiError, ApiOperation};
use crate::middleware::Claims;
use crate::query::{CompilerOptions, FilterInput, QueryOptions};
use crate::repository::{
    PersonnelRepository, Repository, RepositoryErrorKind, SecondaryKeyLookup, UserRepository,
};
use crate::transaction::{Transactioner, TxContext, UnitOfWork};

const BAD_CREDENTIALS: &str = "invalid user name or password";

/// User accounts and their personnel record
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    personnel: PersonnelRepository,
    transactioner: Transactioner,
    hasher: PasswordHasher,
    issuer: JwtIssuer,
    compiler: CompilerOptions,
}

impl UserService {
    /// Create the service
    pub fn new(
        users: UserRepository,
        personnel: PersonnelRepository,
        transactioner: Transactioner,
        hasher: PasswordHasher,
        issuer: JwtIssuer,
        compiler: CompilerOptions,
    ) -> Self {
        Self {
            users,
            personnel,
            transactioner,
            hasher,
            issuer,
            compiler,
        }
    }

    /// Create a user and its personnel record in one unit of work
    ///
    /// A taken user name is a conflict. The personnel record is active, and
    /// its mobile number is the user name.
    #[tracing::instrument(skip(self, input), fields(user_name = %input.user_name))]
    pub async fn register(&self, input: RegisterUserInput) -> Result<User, ApiError> {
        let hasher = self.hasher.clone();
        let password = input.password.clone();
        let password_hash = blocking(move || hasher.hash(&password)).await?;

        let mut uow = self.transactioner.begin().await?;
        let result = self.register_in(&mut uow, input, password_hash).await;
        self.transactioner.finish(uow, result).await
    }

    async fn register_in(
        &self,
        uow: &mut UnitOfWork,
        input: RegisterUserInput,
        password_hash: String,
    ) -> Result<User, ApiError> {
        match self.users.find_by_user_name(uow.context(), &input.user_name).await {
            Ok(_) => {
                return Err(ApiError::conflict(
                    ApiOperation::Create,
                    format!("user name {} is already taken", input.user_name),
                ))
            }
            Err(e) if e.kind == RepositoryErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let user = self
            .users
            .create(
                uow.context(),
                NewUser {
                    user_name: input.user_name,
                    password_hash,
                    role: input.role,
                    organization_id: None,
                },
            )
            .await?;

        let personnel = Personnel {
            first_name: input.first_name,
            last_name: input.last_name,
            mobile: user.user_name.clone(),
            role: user.role.clone(),
            user_id: user.id,
            activation_status: ActivationStatus::Active.as_str().to_string(),
            organization_id: user.organization_id,
            ..Default::default()
        };
        self.personnel.create(uow.context(), personnel).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Exchange credentials for a bearer token
    ///
    /// Unknown user names and wrong passwords are indistinguishable.
    #[tracing::instrument(skip(self, input), fields(user_name = %input.user_name))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let user = match self
            .users
            .find_by_secondary_key(TxContext::NoTx, input.user_name.as_str())
            .await
        {
            Ok(user) => user,
            Err(e) if e.kind == RepositoryErrorKind::NotFound => {
                return Err(ApiError::unauthorized(BAD_CREDENTIALS).with_operation(ApiOperation::Login))
            }
            Err(e) => return Err(ApiError::from(e).with_operation(ApiOperation::Login)),
        };

        let hasher = self.hasher.clone();
        let stored = user.password.clone();
        let matches = blocking(move || hasher.verify(&input.password, &stored)).await?;
        if !matches {
            return Err(ApiError::unauthorized(BAD_CREDENTIALS).with_operation(ApiOperation::Login));
        }

        let claims = Claims::new(user.id, &user.role, user.organization_id);
        let token = self.issuer.generate_token(&claims)?;

        Ok(LoginOutput {
            token,
            expires_in: self.issuer.default_lifetime().as_secs() as i64,
        })
    }

    /// Find a user by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<User, ApiError> {
        Ok(self.users.find_by_id(TxContext::NoTx, id).await?)
    }

    /// Find a user by user name
    pub async fn find_by_user_name(&self, user_name: &str) -> Result<User, ApiError> {
        Ok(self.users.find_by_user_name(TxContext::NoTx, user_name).await?)
    }

    /// Change the non-empty fields of a user, and the names on its personnel record
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<User, ApiError> {
        let password_hash = if input.password.is_empty() {
            None
        } else {
            let hasher = self.hasher.clone();
            let password = input.password.clone();
            Some(blocking(move || hasher.hash(&password)).await?)
        };

        let mut uow = self.transactioner.begin().await?;
        let result = self.update_in(&mut uow, id, input, password_hash).await;
        self.transactioner.finish(uow, result).await
    }

    async fn update_in(
        &self,
        uow: &mut UnitOfWork,
        id: Uuid,
        input: UpdateUserInput,
        password_hash: Option<String>,
    ) -> Result<User, ApiError> {
        let changes = UserChanges {
            user_name: non_empty(input.user_name),
            password_hash,
            role: non_empty(input.role),
        };
        let user = self.users.update(uow.context(), id, changes).await?;

        let first_name = non_empty(input.first_name);
        let last_name = non_empty(input.last_name);
        if first_name.is_some() || last_name.is_some() {
            let mut personnel = self.personnel.find_by_user_id(uow.context(), user.id).await?;
            if let Some(first_name) = first_name {
                personnel.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                personnel.last_name = last_name;
            }
            personnel.mobile = user.user_name.clone();
            self.personnel
                .update(uow.context(), personnel.id, personnel)
                .await?;
        }

        Ok(user)
    }

    /// Soft delete a user
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        Ok(self.users.delete(TxContext::NoTx, id).await?)
    }

    /// Filter users of the caller's organization
    pub async fn filter(
        &self,
        tenant: Option<Uuid>,
        input: FilterInput,
        options: &QueryOptions,
    ) -> Result<Filtered<User>, ApiError> {
        let input = prepare_filter::<User>(input, options, &self.compiler, tenant)?;
        let page = self.users.filter(TxContext::NoTx, &input, options).await?;
        let associations = self
            .users
            .load_associations(TxContext::NoTx, &page.items, options)
            .await?;
        Ok(Filtered::new(page, associations))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
